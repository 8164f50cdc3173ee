//! Project configuration parsing (`bbt_project.yml`)

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "bbt_project.yml";

/// Materialization strategy for a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Materialization {
    /// Create or replace a view (default)
    #[default]
    View,
    /// Create or replace a table
    Table,
    /// Append new rows into an existing table
    Incremental,
}

impl std::fmt::Display for Materialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Materialization::View => write!(f, "view"),
            Materialization::Table => write!(f, "table"),
            Materialization::Incremental => write!(f, "incremental"),
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend type; only duckdb is currently implemented
    #[serde(rename = "type", default = "default_db_type")]
    pub db_type: String,

    /// Path to the database file, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_type() -> String {
    "duckdb".to_string()
}

fn default_db_path() -> String {
    "bbt.duckdb".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: default_db_type(),
            path: default_db_path(),
        }
    }
}

/// Chain-data adapter settings
///
/// The adapter names the source store models may reference via
/// `source('<adapter>', '<table>')`. The core never interprets the
/// provider protocol; sources are opaque qualified names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Adapter name (e.g. "ethereum")
    #[serde(default = "default_adapter_name")]
    pub name: String,
}

fn default_adapter_name() -> String {
    "ethereum".to_string()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            name: default_adapter_name(),
        }
    }
}

/// Execution settings for the run command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Worker pool size; 1 means sequential, deterministic execution
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Per-model query timeout in seconds; absent means no timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_threads() -> usize {
    1
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            timeout_secs: None,
        }
    }
}

/// Project configuration loaded from `bbt_project.yml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Project version string
    #[serde(default = "default_version")]
    pub version: String,

    /// Directories (relative to project root) to scan for models
    #[serde(default = "default_model_paths")]
    pub model_paths: Vec<String>,

    /// Output directory for compiled SQL and run artifacts
    #[serde(default = "default_target_path")]
    pub target_path: String,

    /// Default materialization for models that do not set one
    #[serde(default)]
    pub materialization: Materialization,

    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Chain-data adapter settings
    #[serde(default)]
    pub adapter: AdapterConfig,

    /// Execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Template variables available via var() in model SQL
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_model_paths() -> Vec<String> {
    vec!["models".to_string()]
}

fn default_target_path() -> String {
    "target".to_string()
}

impl Config {
    /// Parse configuration from a YAML string
    pub fn parse(content: &str) -> CoreResult<Self> {
        serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
            message: e.to_string(),
        })
    }

    /// Load configuration from an explicit file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from a project directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        Self::load(&dir.join(CONFIG_FILE))
    }

    /// Model paths resolved against the project root
    pub fn model_paths_absolute(&self, root: &Path) -> Vec<PathBuf> {
        self.model_paths.iter().map(|p| root.join(p)).collect()
    }

    /// Target path resolved against the project root
    pub fn target_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.target_path)
    }
}
