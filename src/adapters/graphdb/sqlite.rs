//! Embedded property-graph store on SQLite.
//!
//! Node labels map to tables (`method`, `class`), relationship types to join
//! tables (`call`, `depends_on`). Unique constraints carry the upsert keys, so
//! `INSERT OR IGNORE` gives merge-on-key with first-writer-wins properties.

use crate::adapters::graphdb::GraphCounts;
use crate::domain::error::StoreError;
use crate::domain::method::{ClassIdentity, MethodIdentity};
use crate::domain::ports::GraphStore;
use rusqlite::{Connection, params};
use std::path::Path;

pub const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS depends_on;
DROP TABLE IF EXISTS call;
DROP TABLE IF EXISTS class;
DROP TABLE IF EXISTS method;
"#;

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS method (
    id INTEGER PRIMARY KEY,
    sig TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    class TEXT NOT NULL,
    package TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS class (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    package TEXT NOT NULL,
    UNIQUE (name, package)
);

CREATE TABLE IF NOT EXISTS call (
    src INTEGER NOT NULL REFERENCES method(id),
    tgt INTEGER NOT NULL REFERENCES method(id),
    kind TEXT NOT NULL,
    PRIMARY KEY (src, tgt, kind)
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS depends_on (
    src INTEGER NOT NULL REFERENCES class(id),
    tgt INTEGER NOT NULL REFERENCES class(id),
    PRIMARY KEY (src, tgt)
) WITHOUT ROWID;

CREATE INDEX IF NOT EXISTS method_name_index ON method(name);
CREATE INDEX IF NOT EXISTS method_class_index ON method(class);
CREATE INDEX IF NOT EXISTS method_package_index ON method(package);
CREATE INDEX IF NOT EXISTS class_name_index ON class(name);
CREATE INDEX IF NOT EXISTS class_package_index ON class(package);
"#;

const INSERT_METHOD: &str =
    "INSERT OR IGNORE INTO method (sig, name, class, package) VALUES (?1, ?2, ?3, ?4)";

const INSERT_CALL: &str = "\
INSERT OR IGNORE INTO call (src, tgt, kind)
SELECT s.id, t.id, ?3 FROM method s, method t WHERE s.sig = ?1 AND t.sig = ?2";

const DERIVE_CLASSES: &str = "\
INSERT OR IGNORE INTO class (name, package)
SELECT m.class, m.package FROM method m
WHERE m.id IN (SELECT src FROM call UNION SELECT tgt FROM call)";

const DERIVE_DEPENDENCIES: &str = "\
INSERT OR IGNORE INTO depends_on (src, tgt)
SELECT DISTINCT sc.id, tc.id
FROM call c
JOIN method s ON s.id = c.src
JOIN method t ON t.id = c.tgt
JOIN class sc ON sc.name = s.class AND sc.package = s.package
JOIN class tc ON tc.name = t.class AND tc.package = t.package";

pub struct SqliteGraphStore {
    conn: Option<Connection>,
}

impl SqliteGraphStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(Self { conn: Some(conn) })
    }

    fn conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }

    fn conn_mut(&mut self) -> Result<&mut Connection, StoreError> {
        self.conn.as_mut().ok_or(StoreError::Closed)
    }

    pub fn counts(&self) -> Result<GraphCounts, StoreError> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<u64, StoreError> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as u64)
        };
        Ok(GraphCounts {
            methods: count("method")?,
            calls: count("call")?,
            classes: count("class")?,
            dependencies: count("depends_on")?,
        })
    }

    /// Stored `(name, class, package)` of the method with signature `sig`.
    pub fn method_properties(&self, sig: &str) -> Result<Option<(String, String, String)>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name, class, package FROM method WHERE sig = ?1")?;
        let mut rows = stmt.query(params![sig])?;
        match rows.next()? {
            Some(row) => Ok(Some((row.get(0)?, row.get(1)?, row.get(2)?))),
            None => Ok(None),
        }
    }

    /// Class-level dependencies as `(source, target)` pairs, sorted.
    pub fn class_dependencies(&self) -> Result<Vec<(ClassIdentity, ClassIdentity)>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT sc.name, sc.package, tc.name, tc.package FROM depends_on d
             JOIN class sc ON sc.id = d.src
             JOIN class tc ON tc.id = d.tgt
             ORDER BY 1, 2, 3, 4",
        )?;
        let rows = stmt.query_map([], |row| {
            let source = ClassIdentity {
                name: row.get(0)?,
                namespace: row.get(1)?,
            };
            let target = ClassIdentity {
                name: row.get(2)?,
                namespace: row.get(3)?,
            };
            Ok((source, target))
        })?;
        let deps = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(deps)
    }
}

fn insert_method(conn: &Connection, m: &MethodIdentity) -> Result<(), StoreError> {
    conn.execute(
        INSERT_METHOD,
        params![m.signature, m.simple_name, m.class_short_name(), m.namespace],
    )?;
    Ok(())
}

impl GraphStore for SqliteGraphStore {
    fn clear_graph(&mut self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(DROP_SQL)?;
        Ok(())
    }

    fn ensure_schema(&mut self) -> Result<(), StoreError> {
        self.conn()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    fn merge_call(
        &mut self,
        source: &MethodIdentity,
        target: &MethodIdentity,
        kind: &str,
    ) -> Result<(), StoreError> {
        let tx = self.conn_mut()?.transaction()?;
        insert_method(&tx, source)?;
        insert_method(&tx, target)?;
        tx.execute(INSERT_CALL, params![source.signature, target.signature, kind])?;
        tx.commit()?;
        Ok(())
    }

    fn merge_class_dependencies(&mut self) -> Result<(), StoreError> {
        let tx = self.conn_mut()?.transaction()?;
        tx.execute(DERIVE_CLASSES, [])?;
        tx.execute(DERIVE_DEPENDENCIES, [])?;
        tx.commit()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), StoreError> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| e)?;
        }
        Ok(())
    }
}
