use crate::domain::edge::Edge;
use crate::domain::error::ExportResult;
use crate::domain::ports::{GraphSink, GraphStore};
use tracing::info;

/// Exports edges into a property-graph store, one transaction per edge.
///
/// Opening the sink wipes the previous export (`Method` and `Class` nodes)
/// and (re)creates constraints and indices.
pub struct GraphDbSink<S: GraphStore> {
    store: S,
    class_graph: bool,
    closed: bool,
}

impl<S: GraphStore> GraphDbSink<S> {
    pub fn open(mut store: S, class_graph: bool) -> ExportResult<Self> {
        info!("Deleting current graph");
        let prepared = store.clear_graph().and_then(|_| {
            info!("Creating constraints and indices");
            store.ensure_schema()
        });
        if let Err(err) = prepared {
            let _ = store.close();
            return Err(err.into());
        }
        Ok(Self {
            store,
            class_graph,
            closed: false,
        })
    }

    /// Derive the class-level dependency layer from the stored method calls.
    pub fn create_class_dependency_graph(&mut self) -> ExportResult<()> {
        info!("Creating class dependency graph");
        self.store.merge_class_dependencies()?;
        Ok(())
    }
}

impl<S: GraphStore> GraphSink for GraphDbSink<S> {
    fn add_edge(&mut self, edge: &Edge) -> ExportResult<()> {
        self.store
            .merge_call(&edge.source, &edge.target, edge.kind.as_str())?;
        Ok(())
    }

    fn finish(&mut self) -> ExportResult<()> {
        if self.class_graph {
            self.create_class_dependency_graph()?;
        }
        Ok(())
    }

    fn close(&mut self) -> ExportResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.store.close()?;
        Ok(())
    }
}

impl<S: GraphStore> Drop for GraphDbSink<S> {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
