//! Neo4j store over Bolt.
//!
//! `neo4rs` is async; the store owns a current-thread runtime and blocks on
//! each call so the export pipeline stays synchronous.

use crate::adapters::graphdb::GraphCounts;
use crate::domain::error::StoreError;
use crate::domain::method::{ClassIdentity, MethodIdentity};
use crate::domain::ports::GraphStore;
use neo4rs::{Graph, Query, Row, query};
use tokio::runtime::Runtime;
use tracing::debug;

pub const DELETE_QUERIES: [&str; 2] = [
    "MATCH (c:Class) DETACH DELETE c",
    "MATCH (m:Method) DETACH DELETE m",
];

pub const SCHEMA_QUERIES: [&str; 8] = [
    "CREATE CONSTRAINT unique_method_sig IF NOT EXISTS FOR (m:Method) REQUIRE (m.sig) IS UNIQUE",
    "CREATE CONSTRAINT unique_class_def IF NOT EXISTS FOR (c:Class) REQUIRE (c.name, c.package) IS UNIQUE",
    "CREATE TEXT INDEX method_sig_index IF NOT EXISTS FOR (m:Method) ON (m.sig)",
    "CREATE TEXT INDEX method_name_index IF NOT EXISTS FOR (m:Method) ON (m.name)",
    "CREATE TEXT INDEX method_class_index IF NOT EXISTS FOR (m:Method) ON (m.class)",
    "CREATE TEXT INDEX method_package_index IF NOT EXISTS FOR (m:Method) ON (m.package)",
    "CREATE TEXT INDEX class_name_index IF NOT EXISTS FOR (c:Class) ON (c.name)",
    "CREATE TEXT INDEX class_package_index IF NOT EXISTS FOR (c:Class) ON (c.package)",
];

pub const ADD_EDGE_QUERY: &str = "\
MERGE (src:Method {sig: $src_sig})
ON CREATE SET src.name = $src_name, src.class = $src_class, src.package = $src_package
MERGE (tgt:Method {sig: $tgt_sig})
ON CREATE SET tgt.name = $tgt_name, tgt.class = $tgt_class, tgt.package = $tgt_package
MERGE (src)-[:CALL {kind: $kind}]->(tgt)";

pub const CLASS_DEPENDENCY_QUERY: &str = "\
MATCH (src:Method)-[:CALL]->(tgt:Method)
MERGE (srcClass:Class {name: src.class, package: src.package})
MERGE (tgtClass:Class {name: tgt.class, package: tgt.package})
MERGE (srcClass)-[:DEPENDS_ON]->(tgtClass)";

const COUNT_QUERIES: [&str; 4] = [
    "MATCH (m:Method) RETURN count(m) AS n",
    "MATCH (:Method)-[r:CALL]->(:Method) RETURN count(r) AS n",
    "MATCH (c:Class) RETURN count(c) AS n",
    "MATCH (:Class)-[d:DEPENDS_ON]->(:Class) RETURN count(d) AS n",
];

const METHOD_PROPERTIES_QUERY: &str =
    "MATCH (m:Method {sig: $sig}) RETURN m.name AS name, m.class AS class, m.package AS package";

const CLASS_DEPENDENCIES_QUERY: &str = "\
MATCH (s:Class)-[:DEPENDS_ON]->(t:Class)
RETURN s.name AS src_name, s.package AS src_package, t.name AS tgt_name, t.package AS tgt_package
ORDER BY src_name, src_package, tgt_name, tgt_package";

pub struct Neo4jStore {
    // dropped before the runtime that drives its connections
    graph: Option<Graph>,
    runtime: Runtime,
}

impl Neo4jStore {
    pub fn connect(uri: &str, user: &str, password: &str) -> Result<Self, StoreError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StoreError::Runtime)?;
        debug!("Connecting to {}", uri);
        let graph = runtime.block_on(Graph::new(uri, user, password))?;
        Ok(Self {
            graph: Some(graph),
            runtime,
        })
    }

    fn graph(&self) -> Result<&Graph, StoreError> {
        self.graph.as_ref().ok_or(StoreError::Closed)
    }

    /// All rows returned by a read query.
    fn fetch(&self, q: Query) -> Result<Vec<Row>, StoreError> {
        let graph = self.graph()?;
        let rows = self.runtime.block_on(async {
            let mut stream = graph.execute(q).await?;
            let mut rows = Vec::new();
            while let Some(row) = stream.next().await? {
                rows.push(row);
            }
            Ok::<_, neo4rs::Error>(rows)
        })?;
        Ok(rows)
    }

    fn count(&self, cypher: &str) -> Result<u64, StoreError> {
        let rows = self.fetch(query(cypher))?;
        let Some(row) = rows.first() else {
            return Ok(0);
        };
        let n: i64 = column(row, "n")?;
        Ok(n as u64)
    }

    pub fn counts(&self) -> Result<GraphCounts, StoreError> {
        let [methods, calls, classes, dependencies] = COUNT_QUERIES;
        Ok(GraphCounts {
            methods: self.count(methods)?,
            calls: self.count(calls)?,
            classes: self.count(classes)?,
            dependencies: self.count(dependencies)?,
        })
    }

    /// Stored `(name, class, package)` of the method with signature `sig`.
    pub fn method_properties(&self, sig: &str) -> Result<Option<(String, String, String)>, StoreError> {
        let rows = self.fetch(query(METHOD_PROPERTIES_QUERY).param("sig", sig))?;
        match rows.first() {
            Some(row) => Ok(Some((
                column(row, "name")?,
                column(row, "class")?,
                column(row, "package")?,
            ))),
            None => Ok(None),
        }
    }

    /// Class-level dependencies as `(source, target)` pairs, sorted.
    pub fn class_dependencies(&self) -> Result<Vec<(ClassIdentity, ClassIdentity)>, StoreError> {
        self.fetch(query(CLASS_DEPENDENCIES_QUERY))?
            .iter()
            .map(|row| -> Result<_, StoreError> {
                let source = ClassIdentity {
                    name: column(row, "src_name")?,
                    namespace: column(row, "src_package")?,
                };
                let target = ClassIdentity {
                    name: column(row, "tgt_name")?,
                    namespace: column(row, "tgt_package")?,
                };
                Ok((source, target))
            })
            .collect()
    }

    /// Run `queries` in one explicit write transaction.
    fn write_transaction(&self, queries: Vec<Query>) -> Result<(), StoreError> {
        let graph = self.graph()?;
        self.runtime.block_on(async {
            let mut txn = graph.start_txn().await?;
            for q in queries {
                if let Err(err) = txn.run(q).await {
                    let _ = txn.rollback().await;
                    return Err(err);
                }
            }
            txn.commit().await
        })?;
        Ok(())
    }
}

fn column<T: serde::de::DeserializeOwned>(row: &Row, key: &str) -> Result<T, StoreError> {
    row.get(key)
        .map_err(|e| StoreError::Decode(format!("column {key}: {e}")))
}

/// Parameters of `ADD_EDGE_QUERY` for one edge.
pub fn add_edge_query(source: &MethodIdentity, target: &MethodIdentity, kind: &str) -> Query {
    query(ADD_EDGE_QUERY)
        .param("src_sig", source.signature.as_str())
        .param("src_name", source.simple_name.as_str())
        .param("src_class", source.class_short_name())
        .param("src_package", source.namespace.as_str())
        .param("tgt_sig", target.signature.as_str())
        .param("tgt_name", target.simple_name.as_str())
        .param("tgt_class", target.class_short_name())
        .param("tgt_package", target.namespace.as_str())
        .param("kind", kind)
}

impl GraphStore for Neo4jStore {
    fn clear_graph(&mut self) -> Result<(), StoreError> {
        self.write_transaction(DELETE_QUERIES.iter().map(|q| query(q)).collect())
    }

    fn ensure_schema(&mut self) -> Result<(), StoreError> {
        // schema operations cannot share a transaction with writes; run each on its own
        let graph = self.graph()?;
        self.runtime.block_on(async {
            for q in SCHEMA_QUERIES {
                graph.run(query(q)).await?;
            }
            Ok::<(), neo4rs::Error>(())
        })?;
        Ok(())
    }

    fn merge_call(
        &mut self,
        source: &MethodIdentity,
        target: &MethodIdentity,
        kind: &str,
    ) -> Result<(), StoreError> {
        self.write_transaction(vec![add_edge_query(source, target, kind)])
    }

    fn merge_class_dependencies(&mut self) -> Result<(), StoreError> {
        self.write_transaction(vec![query(CLASS_DEPENDENCY_QUERY)])
    }

    fn close(&mut self) -> Result<(), StoreError> {
        // dropping the handle closes its pooled connections
        let _guard = self.runtime.enter();
        self.graph.take();
        Ok(())
    }
}
