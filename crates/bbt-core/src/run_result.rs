//! Per-model run outcomes and the aggregated run summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::CoreResult;

/// Final status of one model within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Materialization completed
    Succeeded,
    /// Query failed or timed out
    Failed,
    /// Never ran because an upstream dependency failed, or the run was cancelled
    Skipped,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Succeeded => write!(f, "succeeded"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Kind of failure recorded on a failed model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The per-model timeout expired before the engine returned
    Timeout,
    /// The query engine reported a structured failure
    Query,
}

/// Error detail attached to a failed model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    /// Failure classification
    pub kind: FailureKind,
    /// Engine or timeout message
    pub message: String,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            FailureKind::Timeout => write!(f, "timeout: {}", self.message),
            FailureKind::Query => write!(f, "{}", self.message),
        }
    }
}

/// Outcome record for a single model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Model name
    pub model: String,

    /// Final status
    pub status: RunStatus,

    /// Materialization that was (or would have been) applied
    pub materialization: String,

    /// Wall-clock execution time in seconds (0 for skipped models)
    pub duration_secs: f64,

    /// Rows affected, when the engine reported a count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,

    /// Error detail when status is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
}

impl RunResult {
    /// A skipped result with a reason recorded as the materialization note
    pub fn skipped(model: &str, materialization: &str) -> Self {
        Self {
            model: model.to_string(),
            status: RunStatus::Skipped,
            materialization: materialization.to_string(),
            duration_secs: 0.0,
            rows: None,
            error: None,
        }
    }
}

/// Aggregated outcome of one executor invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Short identifier for this run
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Total wall-clock time in seconds
    pub elapsed_secs: f64,

    /// Per-model results, in completion order
    pub results: Vec<RunResult>,
}

impl RunSummary {
    /// Create a summary for a run that started now
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            started_at: Utc::now(),
            elapsed_secs: 0.0,
            results: Vec::new(),
        }
    }

    /// Overall success: no model reached `Failed`
    pub fn success(&self) -> bool {
        !self
            .results
            .iter()
            .any(|r| r.status == RunStatus::Failed)
    }

    /// Count results with the given status
    pub fn count(&self, status: RunStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Write the summary as pretty JSON, atomically (temp file + rename)
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let temp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn result(model: &str, status: RunStatus) -> RunResult {
        RunResult {
            model: model.to_string(),
            status,
            materialization: "view".to_string(),
            duration_secs: 0.1,
            rows: None,
            error: None,
        }
    }

    #[test]
    fn test_success_requires_no_failures() {
        let mut summary = RunSummary::new();
        summary.results.push(result("a", RunStatus::Succeeded));
        summary.results.push(result("b", RunStatus::Skipped));
        assert!(summary.success());

        summary.results.push(result("c", RunStatus::Failed));
        assert!(!summary.success());
    }

    #[test]
    fn test_counts() {
        let mut summary = RunSummary::new();
        summary.results.push(result("a", RunStatus::Succeeded));
        summary.results.push(result("b", RunStatus::Succeeded));
        summary.results.push(result("c", RunStatus::Failed));
        assert_eq!(summary.count(RunStatus::Succeeded), 2);
        assert_eq!(summary.count(RunStatus::Failed), 1);
        assert_eq!(summary.count(RunStatus::Skipped), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run_results.json");

        let mut summary = RunSummary::new();
        summary.results.push(result("a", RunStatus::Succeeded));
        summary.save(&path).unwrap();

        let loaded: RunSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.run_id, summary.run_id);
        assert_eq!(loaded.results.len(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = RunError {
            kind: FailureKind::Timeout,
            message: "exceeded 30s".to_string(),
        };
        assert_eq!(err.to_string(), "timeout: exceeded 30s");
    }
}
