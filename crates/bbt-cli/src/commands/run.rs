//! Run command implementation - compile, then materialize models in order

use anyhow::{Context, Result};
use bbt_core::{RunStatus, RunSummary};
use bbt_exec::{ExecutableModel, Executor, ExecutorConfig};
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{
    compile_project, create_engine, load_project, resolve_selection, ExitCode,
};

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let mut project = load_project(global)?;
    let dag = compile_project(&mut project)?;
    let order = resolve_selection(&project, &dag, &args.targets, &args.select)?;

    if order.is_empty() {
        println!("No models selected.");
        return Ok(());
    }

    let default_mat = project.config.materialization;
    let mut executable: HashMap<String, ExecutableModel> = HashMap::new();
    for name in &order {
        let model = project.get_model(name)?;
        let sql = model
            .compiled_sql
            .clone()
            .with_context(|| format!("Model '{}' has no compiled SQL", name))?;
        executable.insert(
            name.clone(),
            ExecutableModel {
                name: name.clone(),
                sql,
                materialization: model.materialization(default_mat),
                depends_on: model.depends_on.clone(),
                unique_key: model.config.unique_key.clone(),
            },
        );
    }

    let exec_config = ExecutorConfig {
        threads: args.threads.unwrap_or(project.config.execution.threads).max(1),
        timeout: args
            .timeout
            .or(project.config.execution.timeout_secs)
            .map(Duration::from_secs),
        full_refresh: args.full_refresh,
    };

    println!(
        "Running {} models ({} threads)\n",
        order.len(),
        exec_config.threads
    );

    let engine = create_engine(&project)?;
    let executor = Executor::new(engine, exec_config);

    // Ctrl-C requests a graceful stop: in-flight models finish, the rest skip
    let cancel = executor.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupt received, finishing in-flight models...");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let summary = executor.run(&executable, &order).await;
    print_summary(&summary);

    let results_path = project.target_dir().join("run_results.json");
    summary
        .save(&results_path)
        .context("Failed to write run results")?;
    debug!("wrote run results to {}", results_path.display());

    if summary.success() {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

fn print_summary(summary: &RunSummary) {
    // Completion order varies under parallelism; report by name for stability
    let mut results = summary.results.clone();
    results.sort_by(|a, b| a.model.cmp(&b.model));

    for result in &results {
        match result.status {
            RunStatus::Succeeded => {
                let rows = result
                    .rows
                    .map(|n| format!(", {} rows", n))
                    .unwrap_or_default();
                println!(
                    "  \u{2713} {} ({}{}) [{:.2}s]",
                    result.model, result.materialization, rows, result.duration_secs
                );
            }
            RunStatus::Failed => {
                let detail = result
                    .error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                println!("  \u{2717} {}: {}", result.model, detail);
            }
            RunStatus::Skipped => {
                println!("  - {} (skipped)", result.model);
            }
        }
    }

    println!(
        "\nDone: {} succeeded, {} failed, {} skipped in {:.2}s",
        summary.count(RunStatus::Succeeded),
        summary.count(RunStatus::Failed),
        summary.count(RunStatus::Skipped),
        summary.elapsed_secs
    );
}
