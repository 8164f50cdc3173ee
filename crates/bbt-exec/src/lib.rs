//! bbt-exec - Model executor for BlockBT
//!
//! Turns a selected, topologically ordered set of compiled models into engine
//! operations: level-based scheduling, a bounded worker pool, per-model
//! timeouts, and skip propagation from failed upstreams.

pub mod executor;
pub mod plan;

pub use executor::{Executor, ExecutorConfig};
pub use plan::{compute_levels, ExecutableModel};
