//! Integration tests for BlockBT

use bbt_core::dag::ModelDag;
use bbt_core::{apply_selectors, Materialization, Project, RunStatus};
use bbt_db::{DuckDbEngine, QueryEngine};
use bbt_exec::{ExecutableModel, Executor, ExecutorConfig};
use bbt_jinja::JinjaEnvironment;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

fn load_sample() -> Project {
    Project::load(Path::new("tests/fixtures/sample_project")).unwrap()
}

/// Render every model and build the DAG, the way the compile command does
fn compile(project: &mut Project) -> ModelDag {
    let jinja = JinjaEnvironment::new(&project.config.vars);

    let names: Vec<String> = project.models.keys().cloned().collect();
    for name in names {
        let model = project.models.get_mut(&name).unwrap();
        let rendered = jinja.render_model(&model.raw_sql).unwrap();
        model.depends_on = rendered.refs.clone();
        model.source_deps = rendered.sources.clone();
        if let Some(m) = rendered.config_str("materialized") {
            model.config.materialized = match m.as_str() {
                "table" => Some(Materialization::Table),
                "incremental" => Some(Materialization::Incremental),
                _ => Some(Materialization::View),
            };
        }
        let tags = rendered.config_str_list("tags");
        if !tags.is_empty() {
            model.config.tags = tags;
        }
        model.compiled_sql = Some(rendered.sql);
    }

    ModelDag::build(&project.models).unwrap()
}

#[test]
fn test_load_sample_project() {
    let project = load_sample();

    assert_eq!(project.config.name, "sample_project");
    assert_eq!(project.models.len(), 2);
    assert!(project.models.contains_key("stg_blocks"));
    assert!(project.models.contains_key("block_stats"));
}

#[test]
fn test_compile_captures_dependencies() {
    let mut project = load_sample();
    compile(&mut project);

    let stg = project.get_model("stg_blocks").unwrap();
    assert!(stg.depends_on.is_empty());
    assert!(stg.source_deps.contains("ethereum.blocks"));
    assert!(stg
        .compiled_sql
        .as_ref()
        .unwrap()
        .contains(r#""ethereum"."blocks""#));

    let stats = project.get_model("block_stats").unwrap();
    assert!(stats.depends_on.contains("stg_blocks"));
    assert_eq!(stats.config.materialized, Some(Materialization::Table));
}

#[test]
fn test_selectors_on_sample_project() {
    let mut project = load_sample();
    let dag = compile(&mut project);

    let all = apply_selectors(&[], &project.models, &dag).unwrap();
    assert_eq!(all, vec!["stg_blocks", "block_stats"]);

    let tagged =
        apply_selectors(&["tag:staging".to_string()], &project.models, &dag).unwrap();
    assert_eq!(tagged, vec!["stg_blocks"]);

    let downstream =
        apply_selectors(&["stg_blocks+".to_string()], &project.models, &dag).unwrap();
    assert_eq!(downstream, vec!["stg_blocks", "block_stats"]);

    assert!(apply_selectors(&["no_such".to_string()], &project.models, &dag).is_err());
}

#[tokio::test]
async fn test_end_to_end_run() {
    let mut project = load_sample();
    let dag = compile(&mut project);
    let order = apply_selectors(&[], &project.models, &dag).unwrap();

    let engine: Arc<dyn QueryEngine> = Arc::new(DuckDbEngine::in_memory().unwrap());
    engine.execute("CREATE SCHEMA ethereum").await.unwrap();
    engine
        .execute(
            "CREATE TABLE ethereum.blocks AS \
             SELECT * FROM (VALUES (1, 'alice'), (2, 'bob'), (3, 'alice')) t(number, miner)",
        )
        .await
        .unwrap();

    let default_mat = project.config.materialization;
    let executable: HashMap<String, ExecutableModel> = order
        .iter()
        .map(|name| {
            let model = project.get_model(name).unwrap();
            (
                name.clone(),
                ExecutableModel {
                    name: name.clone(),
                    sql: model.compiled_sql.clone().unwrap(),
                    materialization: model.materialization(default_mat),
                    depends_on: model.depends_on.clone(),
                    unique_key: model.config.unique_key.clone(),
                },
            )
        })
        .collect();

    let executor = Executor::new(Arc::clone(&engine), ExecutorConfig::default());
    let summary = executor.run(&executable, &order).await;

    assert!(summary.success());
    assert_eq!(summary.count(RunStatus::Succeeded), 2);

    let miners = engine
        .query_count("SELECT * FROM block_stats")
        .await
        .unwrap();
    assert_eq!(miners, 2);

    let alice = engine
        .query_count("SELECT * FROM block_stats WHERE miner = 'alice' AND blocks_mined = 2")
        .await
        .unwrap();
    assert_eq!(alice, 1);
}

#[tokio::test]
async fn test_run_with_missing_source_fails_cleanly() {
    let mut project = load_sample();
    let dag = compile(&mut project);
    let order = apply_selectors(&[], &project.models, &dag).unwrap();

    // No ethereum.blocks table this time
    let engine: Arc<dyn QueryEngine> = Arc::new(DuckDbEngine::in_memory().unwrap());

    let default_mat = project.config.materialization;
    let executable: HashMap<String, ExecutableModel> = order
        .iter()
        .map(|name| {
            let model = project.get_model(name).unwrap();
            (
                name.clone(),
                ExecutableModel {
                    name: name.clone(),
                    sql: model.compiled_sql.clone().unwrap(),
                    materialization: model.materialization(default_mat),
                    depends_on: model.depends_on.clone(),
                    unique_key: model.config.unique_key.clone(),
                },
            )
        })
        .collect();

    let executor = Executor::new(engine, ExecutorConfig::default());
    let summary = executor.run(&executable, &order).await;

    assert!(!summary.success());
    assert_eq!(summary.count(RunStatus::Failed), 1);
    assert_eq!(summary.count(RunStatus::Skipped), 1);
}

#[test]
fn test_schema_tests_discovered() {
    let project = load_sample();
    let tests = project.get_model("stg_blocks").unwrap().schema_tests();
    assert_eq!(tests.len(), 3);
}
