//! Error types for bbt-sql

use thiserror::Error;

/// SQL layer errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// S001: SQL failed to parse
    #[error("[S001] SQL parse error: {0}")]
    ParseError(String),

    /// S002: Empty SQL input
    #[error("[S002] SQL input is empty")]
    EmptySql,
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;

impl From<sqlparser::parser::ParserError> for SqlError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        SqlError::ParseError(err.to_string())
    }
}
