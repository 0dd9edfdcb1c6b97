pub mod engine;
pub mod graphdb;
pub mod json;
