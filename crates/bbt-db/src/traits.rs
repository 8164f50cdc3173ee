//! Query engine trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// External query engine collaborator
///
/// Accepts fully-resolved query strings; the orchestration core never builds
/// engine-specific SQL beyond the materialization wrappers. Implementations
/// must be Send + Sync so executor workers can share one connection.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Execute a statement, returning affected rows when the engine reports them
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Materialize a SELECT as a table (CREATE OR REPLACE), returning row count
    async fn create_table_as(&self, name: &str, select: &str) -> DbResult<usize>;

    /// Materialize a SELECT as a view (CREATE OR REPLACE)
    async fn create_view_as(&self, name: &str, select: &str) -> DbResult<()>;

    /// Append a SELECT's rows into an existing table, returning rows inserted
    async fn insert_into_as(&self, name: &str, select: &str) -> DbResult<usize>;

    /// Drop a table or view if it exists
    async fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// Check whether a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Row count of an arbitrary query (used by data tests)
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Up to `limit` result rows as comma-separated strings (test diagnostics)
    async fn query_sample_rows(&self, sql: &str, limit: usize) -> DbResult<Vec<String>>;

    /// Engine type identifier for logging
    fn engine_type(&self) -> &'static str;
}
