use crate::domain::edge::Edge;
use crate::domain::error::ExportResult;
use crate::domain::ports::EdgeSource;

/// Edge source over an in-memory list.
pub struct MemoryEdgeSource {
    items: std::vec::IntoIter<ExportResult<Edge>>,
    edge_count: u64,
    reachable_methods: u64,
}

impl MemoryEdgeSource {
    pub fn new(edges: Vec<Edge>, reachable_methods: u64) -> Self {
        let edge_count = edges.len() as u64;
        Self {
            items: edges.into_iter().map(Ok).collect::<Vec<_>>().into_iter(),
            edge_count,
            reachable_methods,
        }
    }

    /// Source that may yield errors mid-stream; `edge_count` is taken as given.
    pub fn from_results(
        items: Vec<ExportResult<Edge>>,
        edge_count: u64,
        reachable_methods: u64,
    ) -> Self {
        Self {
            items: items.into_iter(),
            edge_count,
            reachable_methods,
        }
    }
}

impl Iterator for MemoryEdgeSource {
    type Item = ExportResult<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

impl EdgeSource for MemoryEdgeSource {
    fn edge_count(&self) -> u64 {
        self.edge_count
    }

    fn reachable_method_count(&self) -> u64 {
        self.reachable_methods
    }
}
