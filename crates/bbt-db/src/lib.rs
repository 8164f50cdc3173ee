//! bbt-db - Query engine abstraction for BlockBT
//!
//! Defines the `QueryEngine` trait the executor materializes models through,
//! plus the DuckDB implementation used by default.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbEngine;
pub use error::{DbError, DbResult};
pub use traits::QueryEngine;
