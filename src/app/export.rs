use crate::adapters::graphdb::{GraphDbSink, Neo4jStore, SqliteGraphStore};
use crate::adapters::json::JsonGraphSink;
use crate::app::config::{ExportConfig, SinkConfig};
use crate::domain::edge::Edge;
use crate::domain::error::{ExportError, ExportResult};
use crate::domain::pipeline::{self, ExportSummary};
use crate::domain::ports::{CallGraphEngine, GraphSink};
use crate::domain::progress::ProgressObserver;
use tracing::info;

/// The sink chosen for a run.
pub enum ExportSink {
    Json(JsonGraphSink),
    Neo4j(GraphDbSink<Neo4jStore>),
    Sqlite(GraphDbSink<SqliteGraphStore>),
}

impl ExportSink {
    /// Open the destination. Fails before any edge is processed.
    pub fn open(config: &SinkConfig) -> ExportResult<Self> {
        match config {
            SinkConfig::Json { output_folder } => Ok(Self::Json(JsonGraphSink::create(output_folder)?)),
            SinkConfig::Neo4j {
                uri,
                user,
                password,
                class_graph,
            } => {
                info!("Connecting to Neo4j at {}", uri);
                let store = Neo4jStore::connect(uri, user, password)?;
                Ok(Self::Neo4j(GraphDbSink::open(store, *class_graph)?))
            }
            SinkConfig::Sqlite { path, class_graph } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        ExportError::Configuration(format!(
                            "Couldn't create database folder at {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                info!("Opening SQLite graph store at {}", path.display());
                let store = SqliteGraphStore::open(path)?;
                Ok(Self::Sqlite(GraphDbSink::open(store, *class_graph)?))
            }
        }
    }

    fn inner(&mut self) -> &mut dyn GraphSink {
        match self {
            Self::Json(sink) => sink,
            Self::Neo4j(sink) => sink,
            Self::Sqlite(sink) => sink,
        }
    }
}

impl GraphSink for ExportSink {
    fn add_edge(&mut self, edge: &Edge) -> ExportResult<()> {
        self.inner().add_edge(edge)
    }

    fn finish(&mut self) -> ExportResult<()> {
        self.inner().finish()
    }

    fn close(&mut self) -> ExportResult<()> {
        self.inner().close()
    }
}

/// Build the call graph with `engine` and export it as configured.
pub fn export_call_graph(
    config: &ExportConfig,
    engine: &dyn CallGraphEngine,
    observer: &mut dyn ProgressObserver,
) -> ExportResult<ExportSummary> {
    let mut sink = ExportSink::open(&config.sink)?;
    let edges = match engine.build_call_graph(&config.engine) {
        Ok(edges) => edges,
        Err(err) => {
            let _ = sink.close();
            return Err(err);
        }
    };
    pipeline::run(edges, &config.filter, &mut sink, observer)
}
