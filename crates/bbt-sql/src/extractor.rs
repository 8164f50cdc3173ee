//! Table reference extraction from SQL AST

use sqlparser::ast::{visit_relations, Statement};
use std::collections::HashSet;

/// Extract every table reference from parsed statements
///
/// Walks the AST with `visit_relations`, collecting relation names from FROM
/// clauses, JOINs, subqueries, and set operations. Quoting is stripped; parts
/// are joined with `.` for schema-qualified names.
pub fn extract_table_references(statements: &[Statement]) -> HashSet<String> {
    let mut refs = HashSet::new();

    for stmt in statements {
        let _ = visit_relations(stmt, |relation| {
            let name = relation
                .0
                .iter()
                .filter_map(|part| part.as_ident())
                .map(|ident| ident.value.clone())
                .collect::<Vec<_>>()
                .join(".");
            refs.insert(name);
            std::ops::ControlFlow::<()>::Continue(())
        });
    }

    refs
}

/// Split extracted references into known names and strangers
///
/// Known names are compared after normalization (last dot-separated
/// component), so `main.stg_blocks` matches the model `stg_blocks`.
pub fn partition_references(
    refs: HashSet<String>,
    known: &HashSet<String>,
) -> (Vec<String>, Vec<String>) {
    let mut matched = Vec::new();
    let mut strangers = Vec::new();

    for r in refs {
        let tail = r.rsplit('.').next().unwrap_or(&r).to_string();
        if known.contains(&r) || known.contains(&tail) {
            matched.push(r);
        } else {
            strangers.push(r);
        }
    }

    matched.sort();
    strangers.sort();
    (matched, strangers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlParser;

    fn extract(sql: &str) -> HashSet<String> {
        let parser = SqlParser::new();
        extract_table_references(&parser.parse(sql).unwrap())
    }

    #[test]
    fn test_simple_select() {
        let refs = extract("SELECT * FROM blocks");
        assert_eq!(refs, HashSet::from(["blocks".to_string()]));
    }

    #[test]
    fn test_join() {
        let refs =
            extract("SELECT * FROM txs t JOIN blocks b ON t.block_number = b.block_number");
        assert!(refs.contains("txs"));
        assert!(refs.contains("blocks"));
    }

    #[test]
    fn test_schema_qualified() {
        let refs = extract(r#"SELECT * FROM "ethereum"."blocks""#);
        assert!(refs.contains("ethereum.blocks"));
    }

    #[test]
    fn test_subquery_and_union() {
        let refs = extract(
            "SELECT * FROM (SELECT * FROM raw_logs) q UNION ALL SELECT * FROM raw_traces",
        );
        assert!(refs.contains("raw_logs"));
        assert!(refs.contains("raw_traces"));
    }

    #[test]
    fn test_partition_references() {
        let refs = HashSet::from([
            "stg_blocks".to_string(),
            "main.stg_txs".to_string(),
            "mystery".to_string(),
        ]);
        let known = HashSet::from(["stg_blocks".to_string(), "stg_txs".to_string()]);

        let (matched, strangers) = partition_references(refs, &known);
        assert_eq!(matched, vec!["main.stg_txs", "stg_blocks"]);
        assert_eq!(strangers, vec!["mystery"]);
    }
}
