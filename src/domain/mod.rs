pub mod method;
pub mod edge;
pub mod error;
pub mod predicate;
pub mod progress;
pub mod pipeline;
pub mod ports;
