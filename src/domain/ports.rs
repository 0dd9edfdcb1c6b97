use crate::app::config::EngineConfig;
use crate::domain::edge::Edge;
use crate::domain::error::{ExportResult, StoreError};
use crate::domain::method::MethodIdentity;

/// Finite, lazily produced edge stream from the analysis engine.
///
/// Both counts come from the engine's own accounting and are known before
/// the first edge is pulled.
pub trait EdgeSource: Iterator<Item = ExportResult<Edge>> {
    fn edge_count(&self) -> u64;

    fn reachable_method_count(&self) -> u64;
}

/// Analysis engine port (implemented by Infrastructure)
pub trait CallGraphEngine {
    fn build_call_graph(&self, config: &EngineConfig) -> ExportResult<Box<dyn EdgeSource>>;
}

/// Destination of admitted edges.
pub trait GraphSink {
    fn add_edge(&mut self, edge: &Edge) -> ExportResult<()>;

    /// Post-processing after the last edge of a successful run.
    fn finish(&mut self) -> ExportResult<()> {
        Ok(())
    }

    /// Release the destination. Runs on every exit path; a second call is a no-op.
    fn close(&mut self) -> ExportResult<()>;
}

/// Property-graph store behind the database sink.
///
/// Every method is its own atomic transaction.
pub trait GraphStore {
    /// Delete every `Method` and `Class` node with their relationships.
    fn clear_graph(&mut self) -> Result<(), StoreError>;

    /// Create uniqueness constraints and lookup indices if missing.
    fn ensure_schema(&mut self) -> Result<(), StoreError>;

    /// Upsert both method nodes (properties set on create only) and the `CALL`
    /// relationship between them.
    fn merge_call(
        &mut self,
        source: &MethodIdentity,
        target: &MethodIdentity,
        kind: &str,
    ) -> Result<(), StoreError>;

    /// Derive `Class` nodes and `DEPENDS_ON` relationships from stored calls.
    fn merge_class_dependencies(&mut self) -> Result<(), StoreError>;

    fn close(&mut self) -> Result<(), StoreError>;
}

impl<T: EdgeSource + ?Sized> EdgeSource for Box<T> {
    fn edge_count(&self) -> u64 {
        (**self).edge_count()
    }

    fn reachable_method_count(&self) -> u64 {
        (**self).reachable_method_count()
    }
}
