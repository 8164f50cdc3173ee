//! bbt-jinja - Templating layer for BlockBT
//!
//! Provides the reference marker syntax used inside model SQL: `ref()` and
//! `source()` expand to relation names while capturing dependencies, and
//! `config()`/`var()` carry model configuration and project variables.

pub mod environment;
pub mod error;
mod functions;

pub use environment::{JinjaEnvironment, RenderedModel};
pub use error::{JinjaError, JinjaResult};
