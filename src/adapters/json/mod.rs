pub mod sink;

pub use sink::{EDGE_LIST_FILE, JsonGraphSink, METHOD_MAPPING_FILE};
