use crate::adapters::engine::jsonl::JsonlEdgeStream;
use crate::app::config::EngineConfig;
use crate::domain::error::{ExportError, ExportResult};
use crate::domain::ports::{CallGraphEngine, EdgeSource};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;

/// Replays a call graph previously captured from the analyzer.
///
/// The engine configuration is ignored: the dump already reflects it.
pub struct DumpFileEngine {
    pub dump_path: PathBuf,
}

impl DumpFileEngine {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> Self {
        Self {
            dump_path: path.as_ref().to_path_buf(),
        }
    }
}

impl CallGraphEngine for DumpFileEngine {
    fn build_call_graph(&self, _config: &EngineConfig) -> ExportResult<Box<dyn EdgeSource>> {
        info!("Reading call graph dump from {}", self.dump_path.display());
        let file = File::open(&self.dump_path).map_err(|e| {
            ExportError::Configuration(format!(
                "cannot open call graph dump {}: {e}",
                self.dump_path.display()
            ))
        })?;
        let stream = JsonlEdgeStream::open(BufReader::new(file))?;
        Ok(Box::new(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_dump_is_configuration_error() {
        let engine = DumpFileEngine::new("/nonexistent/graph-12345.jsonl");
        let err = engine.build_call_graph(&EngineConfig::default()).err().unwrap();
        assert!(matches!(err, ExportError::Configuration(_)));
    }

    #[test]
    fn test_reads_dump_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"edges": 1, "reachable_methods": 2}}"#).unwrap();
        writeln!(
            file,
            r#"{{"src": {{"sig": "a", "class": "p.A", "name": "a"}}, "tgt": {{"sig": "b", "class": "p.B", "name": "b"}}, "kind": "VIRTUAL"}}"#
        )
        .unwrap();

        let source = DumpFileEngine::new(file.path())
            .build_call_graph(&EngineConfig::default())
            .unwrap();
        assert_eq!(source.edge_count(), 1);
        assert_eq!(source.reachable_method_count(), 2);
        assert_eq!(source.count(), 1);
    }
}
