use crate::domain::edge::Edge;
use crate::domain::error::{ExportError, ExportResult};
use crate::domain::method::MethodIdentity;
use crate::domain::ports::GraphSink;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const EDGE_LIST_FILE: &str = "edges.json";
pub const METHOD_MAPPING_FILE: &str = "mapping.json";

#[derive(Serialize)]
struct MethodEntry<'a> {
    method: &'a str,
    class: &'a str,
    package: &'a str,
}

#[derive(Serialize)]
struct EdgeEntry<'a> {
    src: &'a str,
    tgt: &'a str,
    kind: &'a str,
}

/// Incrementally written top-level JSON container (object or array).
///
/// The opening bracket is written on creation; members are appended with a
/// leading comma; `end` appends the closing bracket and flushes.
struct JsonStream {
    path: PathBuf,
    out: Option<BufWriter<File>>,
    close: u8,
    empty: bool,
}

impl JsonStream {
    fn create(path: PathBuf, open: u8, close: u8) -> ExportResult<Self> {
        let file = File::create(&path).map_err(|e| ExportError::io(&path, e))?;
        let mut stream = Self {
            path,
            out: Some(BufWriter::new(file)),
            close,
            empty: true,
        };
        stream.write_raw(&[open])?;
        Ok(stream)
    }

    fn with_writer<F>(&mut self, write: F) -> ExportResult<()>
    where
        F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
    {
        let result = match self.out.as_mut() {
            Some(out) => write(out),
            None => Err(io::Error::other("stream already closed")),
        };
        result.map_err(|e| ExportError::io(&self.path, e))
    }

    fn write_raw(&mut self, bytes: &[u8]) -> ExportResult<()> {
        self.with_writer(|out| out.write_all(bytes))
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> ExportResult<()> {
        self.with_writer(|out| serde_json::to_writer(out, value).map_err(io::Error::from))
    }

    fn begin_member(&mut self) -> ExportResult<()> {
        if !self.empty {
            self.write_raw(b",")?;
        }
        self.empty = false;
        Ok(())
    }

    /// Append one array element.
    fn push_element<T: Serialize>(&mut self, value: &T) -> ExportResult<()> {
        self.begin_member()?;
        self.write_json(value)
    }

    /// Append one `"key": value` object member.
    fn push_field<T: Serialize>(&mut self, key: &str, value: &T) -> ExportResult<()> {
        self.begin_member()?;
        self.write_json(key)?;
        self.write_raw(b":")?;
        self.write_json(value)
    }

    /// Close the container and the file. No-op once closed.
    fn end(&mut self) -> ExportResult<()> {
        let Some(mut out) = self.out.take() else {
            return Ok(());
        };
        out.write_all(&[self.close])
            .and_then(|_| out.flush())
            .map_err(|e| ExportError::io(&self.path, e))
    }
}

/// Streams the call graph into `mapping.json` (signature → method metadata)
/// and `edges.json` (edge list) inside one output folder.
///
/// Each method's metadata is written once, the first time its signature is
/// seen. Both documents stay syntactically valid after `close`, even when
/// the run was aborted part-way.
pub struct JsonGraphSink {
    mapping: JsonStream,
    edges: JsonStream,
    seen: HashSet<String>,
}

impl JsonGraphSink {
    pub fn create(output_folder: &Path) -> ExportResult<Self> {
        if output_folder.exists() && !output_folder.is_dir() {
            return Err(ExportError::Configuration(format!(
                "Couldn't create output folder at {}: path exists and is not a directory",
                output_folder.display()
            )));
        }
        fs::create_dir_all(output_folder).map_err(|e| {
            ExportError::Configuration(format!(
                "Couldn't create output folder at {}: {e}",
                output_folder.display()
            ))
        })?;

        info!("Writing call graph to {}", output_folder.display());
        let mapping = JsonStream::create(output_folder.join(METHOD_MAPPING_FILE), b'{', b'}')?;
        let edges = JsonStream::create(output_folder.join(EDGE_LIST_FILE), b'[', b']')?;

        Ok(Self {
            mapping,
            edges,
            seen: HashSet::new(),
        })
    }

    /// Number of distinct methods written to the mapping so far.
    pub fn method_count(&self) -> usize {
        self.seen.len()
    }

    fn add_method(&mut self, method: &MethodIdentity) -> ExportResult<()> {
        if self.seen.contains(&method.signature) {
            return Ok(());
        }
        self.mapping.push_field(
            &method.signature,
            &MethodEntry {
                method: &method.simple_name,
                class: method.class_short_name(),
                package: &method.namespace,
            },
        )?;
        self.seen.insert(method.signature.clone());
        Ok(())
    }
}

impl GraphSink for JsonGraphSink {
    fn add_edge(&mut self, edge: &Edge) -> ExportResult<()> {
        self.add_method(&edge.source)?;
        self.add_method(&edge.target)?;
        self.edges.push_element(&EdgeEntry {
            src: &edge.source.signature,
            tgt: &edge.target.signature,
            kind: edge.kind.as_str(),
        })
    }

    fn close(&mut self) -> ExportResult<()> {
        // both streams are closed even if the first one fails
        let mapping = self.mapping.end();
        let edges = self.edges.end();
        mapping.and(edges)
    }
}

impl Drop for JsonGraphSink {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::edge::CallKind;
    use serde_json::Value;

    fn method(owning_type: &str, name: &str) -> MethodIdentity {
        MethodIdentity::in_owning_namespace(owning_type, name, format!("<{owning_type}: void {name}()>"))
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_run_writes_empty_documents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let mut sink = JsonGraphSink::create(&out).unwrap();
        sink.close().unwrap();

        assert_eq!(read(&out.join(METHOD_MAPPING_FILE)), serde_json::json!({}));
        assert_eq!(read(&out.join(EDGE_LIST_FILE)), serde_json::json!([]));
    }

    #[test]
    fn test_method_metadata_written_once_per_signature() {
        let dir = tempfile::tempdir().unwrap();
        let a = method("pkg1.A", "foo");
        let b = method("pkg1.B", "bar");
        let mut sink = JsonGraphSink::create(dir.path()).unwrap();
        sink.add_edge(&Edge::new(a.clone(), b.clone(), CallKind::Static)).unwrap();
        sink.add_edge(&Edge::new(b.clone(), a.clone(), CallKind::Virtual)).unwrap();
        sink.add_edge(&Edge::new(a.clone(), a.clone(), CallKind::Special)).unwrap();
        assert_eq!(sink.method_count(), 2);
        sink.close().unwrap();

        let raw = fs::read_to_string(dir.path().join(METHOD_MAPPING_FILE)).unwrap();
        assert_eq!(raw.matches("\"method\"").count(), 2);

        let mapping = read(&dir.path().join(METHOD_MAPPING_FILE));
        assert_eq!(
            mapping[&a.signature],
            serde_json::json!({"method": "foo", "class": "A", "package": "pkg1"})
        );
        let edges = read(&dir.path().join(EDGE_LIST_FILE));
        assert_eq!(edges.as_array().unwrap().len(), 3);
        assert_eq!(
            edges[1],
            serde_json::json!({"src": b.signature, "tgt": a.signature, "kind": "VIRTUAL"})
        );
    }

    #[test]
    fn test_signatures_with_quotes_are_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let odd = MethodIdentity::new("p.Q", "q", "p", "<p.Q: void q(\"x\\y\")>");
        let mut sink = JsonGraphSink::create(dir.path()).unwrap();
        sink.add_edge(&Edge::new(odd.clone(), odd.clone(), CallKind::Static)).unwrap();
        sink.close().unwrap();

        let mapping = read(&dir.path().join(METHOD_MAPPING_FILE));
        assert!(mapping.get(&odd.signature).is_some());
    }

    #[test]
    fn test_output_path_that_is_a_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, b"keep me").unwrap();

        let err = JsonGraphSink::create(&file).err().unwrap();

        assert!(matches!(err, ExportError::Configuration(_)));
        assert_eq!(fs::read(&file).unwrap(), b"keep me");
    }

    #[test]
    fn test_close_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonGraphSink::create(dir.path()).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        assert_eq!(read(&dir.path().join(EDGE_LIST_FILE)), serde_json::json!([]));
    }

    #[test]
    fn test_add_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonGraphSink::create(dir.path()).unwrap();
        sink.close().unwrap();
        let a = method("p.A", "a");
        let err = sink.add_edge(&Edge::new(a.clone(), a, CallKind::Static)).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
    }

    #[test]
    fn test_drop_leaves_valid_documents() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut sink = JsonGraphSink::create(dir.path()).unwrap();
            let a = method("p.A", "a");
            sink.add_edge(&Edge::new(a.clone(), a, CallKind::Static)).unwrap();
        }
        assert_eq!(read(&dir.path().join(EDGE_LIST_FILE)).as_array().unwrap().len(), 1);
        assert_eq!(read(&dir.path().join(METHOD_MAPPING_FILE)).as_object().unwrap().len(), 1);
    }
}
