//! Edge inclusion filters
//!
//! Two independent substring filters decide whether an edge is exported:
//!
//! - namespace patterns are tested against each endpoint's fully qualified
//!   type; each endpoint must contain *some* pattern (not necessarily the same).
//! - identifier patterns are tested against `owningType.simpleName`; a single
//!   pattern must be contained in *both* endpoints.
//!
//! An empty pattern list accepts everything. Matching is case-sensitive.

use crate::domain::edge::Edge;

/// Decides whether an edge reaches the sink. Must be pure.
pub trait EdgePredicate {
    fn matches(&self, edge: &Edge) -> bool;
}

impl<F> EdgePredicate for F
where
    F: Fn(&Edge) -> bool,
{
    fn matches(&self, edge: &Edge) -> bool {
        self(edge)
    }
}

/// Substring-based predicate configured from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeFilter {
    pub namespace_patterns: Vec<String>,
    pub identifier_patterns: Vec<String>,
}

impl EdgeFilter {
    pub fn new(namespace_patterns: Vec<String>, identifier_patterns: Vec<String>) -> Self {
        Self {
            namespace_patterns,
            identifier_patterns,
        }
    }

    /// Filter that admits every edge.
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.namespace_patterns.is_empty() && self.identifier_patterns.is_empty()
    }

    fn namespace_matches(&self, edge: &Edge) -> bool {
        if self.namespace_patterns.is_empty() {
            return true;
        }
        let any_in = |owning_type: &str| {
            self.namespace_patterns
                .iter()
                .any(|p| owning_type.contains(p.as_str()))
        };
        any_in(&edge.source.owning_type) && any_in(&edge.target.owning_type)
    }

    fn identifier_matches(&self, edge: &Edge) -> bool {
        if self.identifier_patterns.is_empty() {
            return true;
        }
        let source = edge.source.identifier();
        let target = edge.target.identifier();
        self.identifier_patterns
            .iter()
            .any(|p| source.contains(p.as_str()) && target.contains(p.as_str()))
    }
}

impl EdgePredicate for EdgeFilter {
    fn matches(&self, edge: &Edge) -> bool {
        self.namespace_matches(edge) && self.identifier_matches(edge)
    }
}
