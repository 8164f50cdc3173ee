//! SQL parser wrapper around sqlparser-rs

use crate::error::{SqlError, SqlResult};
use sqlparser::ast::Statement;
use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;

/// SQL parser fixed to the DuckDB dialect
///
/// The target store is DuckDB; dialect selection is not a concern of this
/// tool, so the wrapper stays monomorphic.
#[derive(Debug, Default)]
pub struct SqlParser {
    dialect: DuckDbDialect,
}

impl SqlParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        Ok(Parser::parse_sql(&self.dialect, sql)?)
    }

    /// Parse SQL expecting a single statement
    pub fn parse_single(&self, sql: &str) -> SqlResult<Statement> {
        let stmts = self.parse(sql)?;
        stmts.into_iter().next().ok_or(SqlError::EmptySql)
    }
}
