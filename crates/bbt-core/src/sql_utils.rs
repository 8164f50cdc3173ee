//! SQL identifier quoting helpers
//!
//! Used when constructing dynamic SQL so that model and source names cannot
//! break out of identifier position.

/// Quote a SQL identifier, escaping embedded double quotes by doubling them.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a potentially schema-qualified name (e.g. `ethereum.blocks`),
/// quoting each dot-separated component individually.
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape a value for use inside a single-quoted SQL string literal.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("blocks"), r#""blocks""#);
        assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(quote_qualified("blocks"), r#""blocks""#);
        assert_eq!(
            quote_qualified("ethereum.blocks"),
            r#""ethereum"."blocks""#
        );
    }

    #[test]
    fn test_escape_sql_string() {
        assert_eq!(escape_sql_string("it's"), "it''s");
    }
}
