//! Error types for bbt-db

use thiserror::Error;

/// Query engine operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// D001: Connection error
    #[error("[D001] Engine connection failed: {0}")]
    ConnectionError(String),

    /// D002: Query execution error
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// D003: Table or view not found
    #[error("[D003] Table or view not found: {0}")]
    RelationNotFound(String),

    /// D004: Mutex poisoned
    #[error("[D004] Engine mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error exposes no structured variants for catalog misses,
        // so classification is by message inspection with narrow patterns.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
        {
            DbError::RelationNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
