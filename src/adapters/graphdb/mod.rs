//! Property-graph database export
//!
//! `GraphDbSink` drives any `GraphStore`; the stores translate its upserts
//! into Cypher over Bolt (`Neo4jStore`) or SQL (`SqliteGraphStore`).

pub mod neo4j;
pub mod sink;
pub mod sqlite;

pub use neo4j::Neo4jStore;
pub use sink::GraphDbSink;
pub use sqlite::SqliteGraphStore;

/// Node and relationship totals of a stored export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphCounts {
    pub methods: u64,
    pub calls: u64,
    pub classes: u64,
    pub dependencies: u64,
}
