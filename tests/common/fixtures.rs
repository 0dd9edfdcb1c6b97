//! Call graph fixtures for integration tests.
#![allow(dead_code)]

use callgraph_export::domain::edge::{CallKind, Edge};
use callgraph_export::domain::method::MethodIdentity;
use std::io::Write;
use std::path::Path;

/// Method in `owning_type` with a Soot-style signature.
pub fn method(owning_type: &str, name: &str, returns: &str) -> MethodIdentity {
    MethodIdentity::in_owning_namespace(
        owning_type,
        name,
        format!("<{owning_type}: {returns} {name}()>"),
    )
}

pub fn a_foo() -> MethodIdentity {
    method("pkg1.A", "foo", "void")
}

pub fn b_bar() -> MethodIdentity {
    method("pkg1.B", "bar", "int")
}

pub fn c_baz() -> MethodIdentity {
    method("pkg2.C", "baz", "void")
}

/// A.foo → B.bar (static), B.bar → A.foo (virtual), C.baz → C.baz (special).
pub fn three_edge_graph() -> Vec<Edge> {
    vec![
        Edge::new(a_foo(), b_bar(), CallKind::Static),
        Edge::new(b_bar(), a_foo(), CallKind::Virtual),
        Edge::new(c_baz(), c_baz(), CallKind::Special),
    ]
}

/// Fan-out graph: `callers` methods in `pkg.Caller` each calling `callees` methods in `pkg.Callee`.
pub fn fan_out_graph(callers: usize, callees: usize) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(callers * callees);
    for i in 0..callers {
        for j in 0..callees {
            edges.push(Edge::new(
                method("pkg.Caller", &format!("call{i}"), "void"),
                method("pkg.Callee", &format!("target{j}"), "void"),
                if j % 2 == 0 { CallKind::Virtual } else { CallKind::Interface },
            ));
        }
    }
    edges
}

/// Write `edges` as a JSON Lines call graph dump.
pub fn write_dump(path: &Path, edges: &[Edge], reachable_methods: u64) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(
        file,
        "{}",
        serde_json::json!({"edges": edges.len(), "reachable_methods": reachable_methods})
    )
    .unwrap();
    for edge in edges {
        writeln!(file, "{}", serde_json::to_string(edge).unwrap()).unwrap();
    }
}
