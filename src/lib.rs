//! callgraph-export library: streams a whole-program call graph into JSON
//! files or a property-graph database.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
