use std::path::PathBuf;

/// Failures raised by a graph store (Neo4j session or SQLite connection).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("neo4j: {0}")]
    Neo4j(#[from] neo4rs::Error),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// A returned row did not have the expected shape.
    #[error("unexpected query result: {0}")]
    Decode(String),

    #[error("store session is already closed")]
    Closed,
}

/// Errors that abort an export run.
///
/// None of these are retried. Anything raised after the sink was opened is
/// reported only after the sink has been closed.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Bad inputs detected before any edge is processed.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The analysis engine's edge stream broke.
    #[error("analysis engine error: {0}")]
    Engine(String),
}

impl ExportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
