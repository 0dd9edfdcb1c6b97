use crate::adapters::engine::jsonl::JsonlEdgeStream;
use crate::app::config::EngineConfig;
use crate::domain::edge::Edge;
use crate::domain::error::{ExportError, ExportResult};
use crate::domain::ports::{CallGraphEngine, EdgeSource};
use std::ffi::OsString;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info};

/// Runs an external whole-program analyzer and streams its JSONL call graph.
pub struct ExternalEngine {
    pub program: PathBuf,
}

impl ExternalEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Command-line options forwarded to the analyzer, in a stable order.
pub fn engine_args(config: &EngineConfig) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["--classpath".into(), config.input_folder.clone().into()];
    for archive in &config.input_archives {
        args.push("--process-dir".into());
        args.push(archive.clone().into());
    }
    args.push("--main-class".into());
    args.push(config.main_class.clone().into());
    for glob in &config.excludes {
        args.push("--exclude".into());
        args.push(glob.into());
    }
    let flags = [
        (config.app_mode, "--app"),
        (config.whole_program, "--whole-program"),
        (config.prepend_classpath, "--prepend-classpath"),
        (config.allow_phantom_refs, "--allow-phantom-refs"),
        (config.no_bodies_for_excluded, "--no-bodies-for-excluded"),
    ];
    args.extend(
        flags
            .iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, flag)| OsString::from(*flag)),
    );
    args
}

impl CallGraphEngine for ExternalEngine {
    fn build_call_graph(&self, config: &EngineConfig) -> ExportResult<Box<dyn EdgeSource>> {
        info!(
            "Loading necessary classes, input jars are: {:?}",
            config.input_archives
        );
        let args = engine_args(config);
        debug!("Spawning {} {:?}", self.program.display(), args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdout(Stdio::piped())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| {
                ExportError::Engine(format!(
                    "failed to start analyzer {}: {e}",
                    self.program.display()
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExportError::Engine("analyzer stdout was not captured".to_string()))?;

        let stream = match JsonlEdgeStream::open(BufReader::new(stdout)) {
            Ok(stream) => stream,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err);
            }
        };

        Ok(Box::new(ProcessEdgeSource {
            child: Some(child),
            stream,
        }))
    }
}

/// Edge stream backed by a running analyzer process.
///
/// The child is reaped once the stream is exhausted; a failing exit status is
/// yielded as a final error item.
struct ProcessEdgeSource {
    child: Option<Child>,
    stream: JsonlEdgeStream<BufReader<ChildStdout>>,
}

impl ProcessEdgeSource {
    fn reap(&mut self) -> Option<ExportResult<Edge>> {
        let mut child = self.child.take()?;
        match child.wait() {
            Ok(status) if status.success() => None,
            Ok(status) => Some(Err(ExportError::Engine(format!(
                "analyzer exited with {status}"
            )))),
            Err(e) => Some(Err(ExportError::Engine(format!(
                "failed to wait for analyzer: {e}"
            )))),
        }
    }
}

impl Iterator for ProcessEdgeSource {
    type Item = ExportResult<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.stream.next() {
            Some(item) => Some(item),
            None => self.reap(),
        }
    }
}

impl EdgeSource for ProcessEdgeSource {
    fn edge_count(&self) -> u64 {
        self.stream.edge_count()
    }

    fn reachable_method_count(&self) -> u64 {
        self.stream.reachable_method_count()
    }
}

impl Drop for ProcessEdgeSource {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
