use super::*;

fn deps(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(name, ds)| {
            (
                name.to_string(),
                ds.iter().map(|d| d.to_string()).collect(),
            )
        })
        .collect()
}

#[test]
fn test_linear_chain_order() {
    let dag = ModelDag::from_dependencies(&deps(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["b"]),
    ]))
    .unwrap();

    assert_eq!(dag.topological_order().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn test_order_respects_every_edge() {
    let dag = ModelDag::from_dependencies(&deps(&[
        ("raw", &[]),
        ("stg_blocks", &["raw"]),
        ("stg_txs", &["raw"]),
        ("daily", &["stg_blocks", "stg_txs"]),
    ]))
    .unwrap();

    let order = dag.topological_order().unwrap();
    let pos = |name: &str| order.iter().position(|m| m == name).unwrap();
    assert!(pos("raw") < pos("stg_blocks"));
    assert!(pos("raw") < pos("stg_txs"));
    assert!(pos("stg_blocks") < pos("daily"));
    assert!(pos("stg_txs") < pos("daily"));
}

#[test]
fn test_ties_broken_by_name() {
    // No edges at all: order must be pure name order.
    let dag = ModelDag::from_dependencies(&deps(&[
        ("zebra", &[]),
        ("apple", &[]),
        ("mango", &[]),
    ]))
    .unwrap();

    assert_eq!(
        dag.topological_order().unwrap(),
        vec!["apple", "mango", "zebra"]
    );
}

#[test]
fn test_order_is_deterministic() {
    let map = deps(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["a"]),
        ("d", &["b", "c"]),
        ("e", &["a"]),
    ]);

    let first = ModelDag::from_dependencies(&map)
        .unwrap()
        .topological_order()
        .unwrap();
    for _ in 0..10 {
        let again = ModelDag::from_dependencies(&map)
            .unwrap()
            .topological_order()
            .unwrap();
        assert_eq!(first, again);
    }
}

#[test]
fn test_cycle_detected() {
    let result = ModelDag::from_dependencies(&deps(&[
        ("a", &["c"]),
        ("b", &["a"]),
        ("c", &["b"]),
    ]));

    match result {
        Err(CoreError::CircularDependency { cycle }) => {
            assert!(cycle.contains("->"), "cycle path missing: {}", cycle);
        }
        other => panic!("expected CircularDependency, got {:?}", other),
    }
}

#[test]
fn test_self_reference_is_a_cycle() {
    let result = ModelDag::from_dependencies(&deps(&[("a", &["a"])]));
    assert!(matches!(
        result,
        Err(CoreError::CircularDependency { .. })
    ));
}

#[test]
fn test_unresolved_reference() {
    let result = ModelDag::from_dependencies(&deps(&[("a", &["ghost"])]));
    match result {
        Err(CoreError::UnresolvedReference { model, reference }) => {
            assert_eq!(model, "a");
            assert_eq!(reference, "ghost");
        }
        other => panic!("expected UnresolvedReference, got {:?}", other),
    }
}

#[test]
fn test_ancestors_and_descendants() {
    let dag = ModelDag::from_dependencies(&deps(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["b"]),
        ("side", &[]),
    ]))
    .unwrap();

    let mut ancestors = dag.ancestors("c");
    ancestors.sort_unstable();
    assert_eq!(ancestors, vec!["a", "b"]);

    let mut descendants = dag.descendants("a");
    descendants.sort_unstable();
    assert_eq!(descendants, vec!["b", "c"]);

    assert!(dag.ancestors("side").is_empty());
    assert!(dag.descendants("missing").is_empty());
}

#[test]
fn test_direct_dependencies() {
    let dag = ModelDag::from_dependencies(&deps(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &["a", "b"]),
    ]))
    .unwrap();

    let mut ds = dag.dependencies("c");
    ds.sort_unstable();
    assert_eq!(ds, vec!["a", "b"]);
    assert!(dag.dependencies("a").is_empty());
}

#[test]
fn test_build_from_models() {
    use crate::model::{Model, ModelConfig};
    use std::collections::HashSet;
    use std::path::PathBuf;

    let mk = |name: &str, deps: &[&str]| Model {
        name: name.to_string(),
        path: PathBuf::from(format!("{}.sql", name)),
        raw_sql: "SELECT 1".to_string(),
        compiled_sql: None,
        config: ModelConfig::default(),
        depends_on: deps.iter().map(|d| d.to_string()).collect(),
        source_deps: HashSet::from(["ethereum.blocks".to_string()]),
        schema: None,
    };

    let models = HashMap::from([
        ("a".to_string(), mk("a", &[])),
        ("b".to_string(), mk("b", &["a"])),
    ]);

    // Source deps never become edges or unresolved references.
    let dag = ModelDag::build(&models).unwrap();
    assert_eq!(dag.topological_order().unwrap(), vec!["a", "b"]);
}
