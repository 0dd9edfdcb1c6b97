//! JSON Lines decoder for call graphs emitted by the analysis engine.
//!
//! Line 1 is a header with the engine's counts, every further non-blank line
//! is one edge. Lines are decoded one at a time so the stream is never held
//! in memory.

use crate::domain::edge::{CallKind, Edge};
use crate::domain::error::{ExportError, ExportResult};
use crate::domain::method::{MethodIdentity, namespace_of};
use crate::domain::ports::EdgeSource;
use serde::Deserialize;
use std::io::BufRead;

#[derive(Debug, Deserialize)]
struct GraphHeader {
    edges: u64,
    reachable_methods: u64,
}

#[derive(Debug, Deserialize)]
struct MethodRecord {
    sig: String,
    class: String,
    name: String,
    #[serde(default)]
    package: Option<String>,
}

impl From<MethodRecord> for MethodIdentity {
    fn from(r: MethodRecord) -> Self {
        let namespace = r
            .package
            .unwrap_or_else(|| namespace_of(&r.class).to_string());
        MethodIdentity::new(r.class, r.name, namespace, r.sig)
    }
}

#[derive(Debug, Deserialize)]
struct EdgeRecord {
    src: MethodRecord,
    tgt: MethodRecord,
    kind: CallKind,
}

/// Streaming edge source over any buffered reader.
pub struct JsonlEdgeStream<R> {
    reader: R,
    header: GraphHeader,
    line: String,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> JsonlEdgeStream<R> {
    /// Read the header line; edges are decoded lazily afterwards.
    pub fn open(mut reader: R) -> ExportResult<Self> {
        let mut line = String::new();
        let mut line_no = 0;
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| ExportError::Engine(format!("failed to read call graph header: {e}")))?;
            if read == 0 {
                return Err(ExportError::Engine(
                    "call graph stream is empty (missing header)".to_string(),
                ));
            }
            line_no += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let header: GraphHeader = serde_json::from_str(line.trim()).map_err(|e| {
            ExportError::Engine(format!("line {line_no}: invalid call graph header: {e}"))
        })?;

        Ok(Self {
            reader,
            header,
            line,
            line_no,
            done: false,
        })
    }

    fn read_edge(&mut self) -> Option<ExportResult<Edge>> {
        loop {
            self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    return Some(Err(ExportError::Engine(format!(
                        "failed to read call graph after line {}: {e}",
                        self.line_no
                    ))));
                }
            }
            self.line_no += 1;
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            let parsed = serde_json::from_str::<EdgeRecord>(text)
                .map(|r| Edge::new(r.src.into(), r.tgt.into(), r.kind))
                .map_err(|e| ExportError::Engine(format!("line {}: invalid edge: {e}", self.line_no)));
            return Some(parsed);
        }
    }
}

impl<R: BufRead> Iterator for JsonlEdgeStream<R> {
    type Item = ExportResult<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.read_edge();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl<R: BufRead> EdgeSource for JsonlEdgeStream<R> {
    fn edge_count(&self) -> u64 {
        self.header.edges
    }

    fn reachable_method_count(&self) -> u64 {
        self.header.reachable_methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GRAPH: &str = r#"{"edges": 2, "reachable_methods": 7}
{"src": {"sig": "<pkg1.A: void foo()>", "class": "pkg1.A", "name": "foo", "package": "pkg1"}, "tgt": {"sig": "<pkg1.B: int bar()>", "class": "pkg1.B", "name": "bar"}, "kind": "STATIC"}

{"src": {"sig": "<pkg1.B: int bar()>", "class": "pkg1.B", "name": "bar"}, "tgt": {"sig": "<Main: void run()>", "class": "Main", "name": "run"}, "kind": "THREAD_FAKE"}
"#;

    #[test]
    fn test_reads_header_counts() {
        let stream = JsonlEdgeStream::open(Cursor::new(GRAPH)).unwrap();
        assert_eq!(stream.edge_count(), 2);
        assert_eq!(stream.reachable_method_count(), 7);
    }

    #[test]
    fn test_decodes_edges_and_derives_missing_package() {
        let stream = JsonlEdgeStream::open(Cursor::new(GRAPH)).unwrap();
        let edges: Vec<Edge> = stream.collect::<Result<_, _>>().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].kind, CallKind::Static);
        assert_eq!(edges[0].target.namespace, "pkg1");
        assert_eq!(edges[1].target.namespace, "");
        assert_eq!(edges[1].kind, CallKind::Other("THREAD_FAKE".into()));
    }

    #[test]
    fn test_empty_input_is_an_engine_error() {
        let err = JsonlEdgeStream::open(Cursor::new("\n\n")).err().unwrap();
        assert!(matches!(err, ExportError::Engine(_)));
    }

    #[test]
    fn test_bad_edge_reports_line_and_stops() {
        let input = "{\"edges\": 3, \"reachable_methods\": 1}\n{not json}\n";
        let mut stream = JsonlEdgeStream::open(Cursor::new(input)).unwrap();
        match stream.next() {
            Some(Err(ExportError::Engine(msg))) => assert!(msg.contains("line 2"), "{msg}"),
            other => panic!("expected engine error, got {other:?}"),
        }
        assert!(stream.next().is_none());
    }
}
