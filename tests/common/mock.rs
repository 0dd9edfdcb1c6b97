//! Mock implementations for integration tests.
#![allow(dead_code)]

use callgraph_export::domain::edge::Edge;
use callgraph_export::domain::error::{ExportError, ExportResult};
use callgraph_export::domain::ports::GraphSink;

/// Sink that records every call it receives.
#[derive(Default)]
pub struct RecordingSink {
    pub edges: Vec<Edge>,
    pub finished: bool,
    pub closed: usize,
}

impl GraphSink for RecordingSink {
    fn add_edge(&mut self, edge: &Edge) -> ExportResult<()> {
        self.edges.push(edge.clone());
        Ok(())
    }

    fn finish(&mut self) -> ExportResult<()> {
        self.finished = true;
        Ok(())
    }

    fn close(&mut self) -> ExportResult<()> {
        self.closed += 1;
        Ok(())
    }
}

/// Wraps a sink and fails with an I/O error on the `fail_at`-th edge (0-based).
pub struct FailingSink<S> {
    pub inner: S,
    pub fail_at: usize,
    seen: usize,
}

impl<S> FailingSink<S> {
    pub fn new(inner: S, fail_at: usize) -> Self {
        Self {
            inner,
            fail_at,
            seen: 0,
        }
    }
}

impl<S: GraphSink> GraphSink for FailingSink<S> {
    fn add_edge(&mut self, edge: &Edge) -> ExportResult<()> {
        if self.seen == self.fail_at {
            return Err(ExportError::io(
                "mock",
                std::io::Error::other("simulated write failure"),
            ));
        }
        self.seen += 1;
        self.inner.add_edge(edge)
    }

    fn finish(&mut self) -> ExportResult<()> {
        self.inner.finish()
    }

    fn close(&mut self) -> ExportResult<()> {
        self.inner.close()
    }
}
