//! bbt-sql - SQL parsing layer for BlockBT
//!
//! Wraps sqlparser-rs for sanity-parsing rendered model SQL and extracting
//! table references from the AST.

pub mod error;
pub mod extractor;
pub mod parser;

pub use error::{SqlError, SqlResult};
pub use extractor::{extract_table_references, partition_references};
pub use parser::SqlParser;
