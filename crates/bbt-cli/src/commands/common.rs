//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use bbt_core::dag::ModelDag;
use bbt_core::{apply_selectors, Materialization, Project};
use bbt_db::{DuckDbEngine, QueryEngine};
use bbt_jinja::JinjaEnvironment;
use bbt_sql::{extract_table_references, partition_references, SqlParser};
use log::warn;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error, and nothing should print for it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load a project from the directory specified in global CLI arguments.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    Project::load(Path::new(&global.project_dir)).context("Failed to load project")
}

/// Compile every model in the project: render templates, capture
/// dependencies and config, sanity-parse the SQL, and build the DAG.
///
/// Compilation is all-or-nothing; the first failing model aborts with an
/// error naming it. On success every model carries `compiled_sql`.
pub(crate) fn compile_project(project: &mut Project) -> Result<ModelDag> {
    let jinja = JinjaEnvironment::new(&project.config.vars);
    let parser = SqlParser::new();
    let known: HashSet<String> = project.models.keys().cloned().collect();

    let names: Vec<String> = project.models.keys().cloned().collect();
    for name in names {
        let Some(model) = project.models.get_mut(&name) else {
            continue;
        };

        let rendered = jinja
            .render_model(&model.raw_sql)
            .with_context(|| format!("Failed to render model '{}'", name))?;

        // Parse for syntax errors before anything reaches the database
        let stmts = parser
            .parse(&rendered.sql)
            .with_context(|| format!("Compiled SQL for model '{}' does not parse", name))?;

        // Dependencies are tracked through ref() only; a bare table reference
        // that happens to name another model would run in the wrong order
        let (matched, _) = partition_references(extract_table_references(&stmts), &known);
        for table in matched {
            let tail = table.rsplit('.').next().unwrap_or(&table);
            if tail != name && !rendered.refs.contains(tail) {
                warn!(
                    "model '{}' reads '{}' without ref(); dependency not tracked",
                    name, table
                );
            }
        }

        model.depends_on = rendered.refs.clone();
        model.source_deps = rendered.sources.clone();
        if let Some(m) = rendered.config_str("materialized") {
            model.config.materialized = Some(parse_materialization(&m));
        }
        let tags = rendered.config_str_list("tags");
        if !tags.is_empty() {
            model.config.tags = tags;
        }
        if let Some(key) = rendered.config_str("unique_key") {
            model.config.unique_key = Some(key);
        }
        model.compiled_sql = Some(rendered.sql);
    }

    let dag = ModelDag::build(&project.models).context("Failed to build dependency graph")?;
    dag.validate()?;
    Ok(dag)
}

/// Parse a materialization string from Jinja config values.
pub(crate) fn parse_materialization(s: &str) -> Materialization {
    match s {
        "table" => Materialization::Table,
        "incremental" => Materialization::Incremental,
        _ => Materialization::View,
    }
}

/// Resolve selector expressions (positional targets plus --select flags)
/// into an execution order. Empty selection means every model.
pub(crate) fn resolve_selection(
    project: &Project,
    dag: &ModelDag,
    targets: &[String],
    select: &[String],
) -> Result<Vec<String>> {
    let expressions: Vec<String> = targets.iter().chain(select.iter()).cloned().collect();
    Ok(apply_selectors(&expressions, &project.models, dag)?)
}

/// Open the query engine configured for the project.
///
/// Relative database paths resolve against the project root so that the
/// CLI behaves the same regardless of the invoking directory.
pub(crate) fn create_engine(project: &Project) -> Result<Arc<dyn QueryEngine>> {
    let db = &project.config.database;
    if db.db_type != "duckdb" {
        anyhow::bail!("Unsupported database type '{}'", db.db_type);
    }

    let path = if db.path == ":memory:" || Path::new(&db.path).is_absolute() {
        db.path.clone()
    } else {
        project.root.join(&db.path).display().to_string()
    };

    let engine = DuckDbEngine::new(&path)
        .with_context(|| format!("Failed to open database '{}'", path))?;
    Ok(Arc::new(engine))
}
