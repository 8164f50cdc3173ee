//! DAG-aware model executor
//!
//! Runs selected models level by level: every model in a level has all of its
//! upstreams settled, so a level can run in parallel under a bounded worker
//! pool. A model enters Running only after every upstream Succeeded; a failed
//! or skipped upstream cascades Skipped to everything downstream of it, while
//! independent branches keep running.

use crate::plan::{compute_levels, ExecutableModel};
use bbt_core::sql_utils::quote_ident;
use bbt_core::{FailureKind, Materialization, RunError, RunResult, RunStatus, RunSummary};
use bbt_db::QueryEngine;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Executor tuning knobs
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Worker pool size; 1 gives fully serial execution
    pub threads: usize,
    /// Per-model wall-clock budget; None disables the timeout
    pub timeout: Option<Duration>,
    /// Rebuild incremental models from scratch
    pub full_refresh: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            timeout: None,
            full_refresh: false,
        }
    }
}

/// Runs models against a query engine in dependency order
pub struct Executor {
    engine: Arc<dyn QueryEngine>,
    config: ExecutorConfig,
    cancelled: Arc<AtomicBool>,
}

impl Executor {
    pub fn new(engine: Arc<dyn QueryEngine>, config: ExecutorConfig) -> Self {
        Self {
            engine,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag a signal handler can set to stop the run
    ///
    /// Once set, no new model enters Running; models already in flight finish
    /// and every unstarted model is recorded as Skipped.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Execute `order` (a topological order of the selected models)
    pub async fn run(
        &self,
        models: &HashMap<String, ExecutableModel>,
        order: &[String],
    ) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::new();

        let levels = compute_levels(order, models);
        info!(
            "executing {} models in {} levels with {} threads",
            order.len(),
            levels.len(),
            self.config.threads
        );

        let semaphore = Arc::new(Semaphore::new(self.config.threads));
        let results: Arc<Mutex<Vec<RunResult>>> = Arc::new(Mutex::new(Vec::new()));
        // Models whose downstreams must not run
        let blocked: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

        for level in &levels {
            let mut handles = Vec::new();

            for name in level {
                let Some(model) = models.get(name) else {
                    warn!("model '{}' missing from execution plan, skipping", name);
                    continue;
                };
                let model = model.clone();

                let engine = Arc::clone(&self.engine);
                let semaphore = Arc::clone(&semaphore);
                let results = Arc::clone(&results);
                let blocked = Arc::clone(&blocked);
                let cancelled = Arc::clone(&self.cancelled);
                let timeout = self.config.timeout;
                let full_refresh = self.config.full_refresh;

                let handle = tokio::spawn(async move {
                    let _permit = match semaphore.acquire().await {
                        Ok(permit) => permit,
                        Err(_) => return,
                    };

                    let materialization = model.materialization.to_string();

                    // Settled upstreams that did not succeed block this model
                    let upstream_blocked = {
                        let blocked = blocked.lock().unwrap_or_else(|p| p.into_inner());
                        model.depends_on.iter().any(|dep| blocked.contains(dep))
                    };

                    if upstream_blocked || cancelled.load(Ordering::SeqCst) {
                        debug!("skipping model '{}'", model.name);
                        blocked
                            .lock()
                            .unwrap_or_else(|p| p.into_inner())
                            .insert(model.name.clone());
                        results
                            .lock()
                            .unwrap_or_else(|p| p.into_inner())
                            .push(RunResult::skipped(&model.name, &materialization));
                        return;
                    }

                    debug!("running model '{}' as {}", model.name, materialization);
                    let result = run_single_model(&engine, &model, timeout, full_refresh).await;

                    if result.status != RunStatus::Succeeded {
                        blocked
                            .lock()
                            .unwrap_or_else(|p| p.into_inner())
                            .insert(model.name.clone());
                    }
                    results
                        .lock()
                        .unwrap_or_else(|p| p.into_inner())
                        .push(result);
                });

                handles.push(handle);
            }

            // A level must fully settle before the next one starts
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!("task join error: {}", e);
                }
            }
        }

        summary.results = results.lock().unwrap_or_else(|p| p.into_inner()).clone();
        summary.elapsed_secs = started.elapsed().as_secs_f64();
        summary
    }
}

/// Materialize one model, applying the per-model timeout when configured
async fn run_single_model(
    engine: &Arc<dyn QueryEngine>,
    model: &ExecutableModel,
    timeout: Option<Duration>,
    full_refresh: bool,
) -> RunResult {
    let started = Instant::now();
    let materialization = model.materialization.to_string();

    let outcome = match timeout {
        Some(budget) => match tokio::time::timeout(budget, materialize(engine, model, full_refresh))
            .await
        {
            Ok(result) => result,
            Err(_) => {
                return RunResult {
                    model: model.name.clone(),
                    status: RunStatus::Failed,
                    materialization,
                    duration_secs: started.elapsed().as_secs_f64(),
                    rows: None,
                    error: Some(RunError {
                        kind: FailureKind::Timeout,
                        message: format!("exceeded {}s budget", budget.as_secs()),
                    }),
                };
            }
        },
        None => materialize(engine, model, full_refresh).await,
    };

    match outcome {
        Ok(rows) => RunResult {
            model: model.name.clone(),
            status: RunStatus::Succeeded,
            materialization,
            duration_secs: started.elapsed().as_secs_f64(),
            rows,
            error: None,
        },
        Err(e) => RunResult {
            model: model.name.clone(),
            status: RunStatus::Failed,
            materialization,
            duration_secs: started.elapsed().as_secs_f64(),
            rows: None,
            error: Some(RunError {
                kind: FailureKind::Query,
                message: e.to_string(),
            }),
        },
    }
}

/// Apply the model's materialization strategy
async fn materialize(
    engine: &Arc<dyn QueryEngine>,
    model: &ExecutableModel,
    full_refresh: bool,
) -> bbt_db::DbResult<Option<usize>> {
    let relation = quote_ident(&model.name);

    match model.materialization {
        Materialization::View => {
            engine.create_view_as(&relation, &model.sql).await?;
            Ok(None)
        }
        Materialization::Table => {
            let rows = engine.create_table_as(&relation, &model.sql).await?;
            Ok(Some(rows))
        }
        Materialization::Incremental => {
            if full_refresh {
                engine.drop_if_exists(&relation).await?;
            }
            if engine.relation_exists(&relation).await? {
                if let Some(key) = &model.unique_key {
                    // Replace rows whose key reappears in the new batch
                    let key = quote_ident(key);
                    let delete = format!(
                        "DELETE FROM {} WHERE {} IN (SELECT {} FROM ({}))",
                        relation, key, key, model.sql
                    );
                    engine.execute(&delete).await?;
                }
                let rows = engine.insert_into_as(&relation, &model.sql).await?;
                Ok(Some(rows))
            } else {
                let rows = engine.create_table_as(&relation, &model.sql).await?;
                Ok(Some(rows))
            }
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
