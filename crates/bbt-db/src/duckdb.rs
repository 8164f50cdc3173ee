//! DuckDB query engine implementation

use crate::error::{DbError, DbResult};
use crate::traits::QueryEngine;
use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// DuckDB backed query engine
pub struct DuckDbEngine {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbEngine {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create from a path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Run connection work on the blocking pool
    ///
    /// DuckDB calls are synchronous; running them inline would pin an async
    /// worker for the whole statement and keep timeout futures from firing.
    async fn with_conn<T, F>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| DbError::ExecutionError(format!("blocking task failed: {}", e)))?
    }
}

fn execute_on(conn: &Connection, sql: &str) -> DbResult<usize> {
    conn.execute(sql, [])
        .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
}

fn query_count_on(conn: &Connection, sql: &str) -> DbResult<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
            row.get(0)
        })
        .map_err(|e| DbError::ExecutionError(e.to_string()))?;
    Ok(count as usize)
}

fn relation_exists_on(conn: &Connection, name: &str) -> DbResult<bool> {
    let (schema, table) = split_relation(name);
    let schema = schema.unwrap_or_else(|| "main".to_string());

    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
            params![schema, table],
            |row| row.get(0),
        )
        .map_err(|e| DbError::ExecutionError(e.to_string()))?;

    Ok(count > 0)
}

/// Fetch up to `limit` rows formatted for diagnostic display
fn query_sample_on(conn: &Connection, sql: &str, limit: usize) -> DbResult<Vec<String>> {
    let wrapped = format!("SELECT * FROM ({}) LIMIT {}", sql, limit);
    let mut stmt = conn.prepare(&wrapped)?;
    let mut rows = stmt.query([])?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut parts = Vec::new();
        let mut idx = 0;
        loop {
            match row.get::<_, Value>(idx) {
                Ok(value) => parts.push(format_value(&value)),
                Err(_) => break,
            }
            idx += 1;
        }
        out.push(parts.join(", "));
    }
    Ok(out)
}

/// Split an optionally schema-qualified, optionally quoted relation name into
/// bare (schema, table) components.
///
/// Callers splice quoted identifiers into DDL and pass the same text here,
/// while information_schema stores the unquoted form.
fn split_relation(name: &str) -> (Option<String>, String) {
    let mut in_quotes = false;
    let mut split_at = None;
    for (i, c) in name.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => split_at = Some(i),
            _ => {}
        }
    }
    match split_at {
        Some(i) => (Some(unquote_part(&name[..i])), unquote_part(&name[i + 1..])),
        None => (None, unquote_part(name)),
    }
}

fn unquote_part(part: &str) -> String {
    let part = part.trim();
    if part.len() >= 2 && part.starts_with('"') && part.ends_with('"') {
        part[1..part.len() - 1].replace("\"\"", "\"")
    } else {
        part.to_string()
    }
}

/// Render a DuckDB value for test failure output
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::TinyInt(n) => n.to_string(),
        Value::SmallInt(n) => n.to_string(),
        Value::Int(n) => n.to_string(),
        Value::BigInt(n) => n.to_string(),
        Value::UTinyInt(n) => n.to_string(),
        Value::USmallInt(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::UBigInt(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Double(n) => n.to_string(),
        Value::Text(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

#[async_trait]
impl QueryEngine for DuckDbEngine {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        let sql = sql.to_string();
        self.with_conn(move |conn| execute_on(conn, &sql)).await
    }

    async fn create_table_as(&self, name: &str, select: &str) -> DbResult<usize> {
        let create = format!("CREATE OR REPLACE TABLE {} AS {}", name, select);
        let count = format!("SELECT * FROM {}", name);
        self.with_conn(move |conn| {
            execute_on(conn, &create)?;
            query_count_on(conn, &count)
        })
        .await
    }

    async fn create_view_as(&self, name: &str, select: &str) -> DbResult<()> {
        let sql = format!("CREATE OR REPLACE VIEW {} AS {}", name, select);
        self.with_conn(move |conn| {
            execute_on(conn, &sql)?;
            Ok(())
        })
        .await
    }

    async fn insert_into_as(&self, name: &str, select: &str) -> DbResult<usize> {
        let sql = format!("INSERT INTO {} {}", name, select);
        self.with_conn(move |conn| execute_on(conn, &sql)).await
    }

    async fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        // The relation may be either kind, so try both
        let drop_view = format!("DROP VIEW IF EXISTS {}", name);
        let drop_table = format!("DROP TABLE IF EXISTS {}", name);
        self.with_conn(move |conn| {
            let _ = execute_on(conn, &drop_view);
            let _ = execute_on(conn, &drop_table);
            Ok(())
        })
        .await
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let name = name.to_string();
        self.with_conn(move |conn| relation_exists_on(conn, &name))
            .await
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        let sql = sql.to_string();
        self.with_conn(move |conn| query_count_on(conn, &sql)).await
    }

    async fn query_sample_rows(&self, sql: &str, limit: usize) -> DbResult<Vec<String>> {
        let sql = sql.to_string();
        self.with_conn(move |conn| query_sample_on(conn, &sql, limit))
            .await
    }

    fn engine_type(&self) -> &'static str {
        "duckdb"
    }
}
