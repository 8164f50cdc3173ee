//! bbt-core - Core library for BlockBT
//!
//! Shared types across the BlockBT components: project configuration, the
//! model registry, the dependency DAG, selectors, and run outcome records.

pub mod config;
pub mod dag;
pub mod error;
pub mod model;
pub mod project;
pub mod run_result;
pub mod selector;
pub mod sql_utils;

pub use config::{Config, Materialization};
pub use dag::ModelDag;
pub use error::{CoreError, CoreResult};
pub use model::{Model, ModelConfig, ModelSchema, SchemaTest, TestType};
pub use project::Project;
pub use run_result::{FailureKind, RunError, RunResult, RunStatus, RunSummary};
pub use selector::{apply_selectors, Selector};
