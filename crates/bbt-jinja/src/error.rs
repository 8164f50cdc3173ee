//! Error types for bbt-jinja

use thiserror::Error;

/// Template rendering errors
#[derive(Error, Debug)]
pub enum JinjaError {
    /// J001: Template failed to render
    #[error("[J001] Template render error: {0}")]
    RenderError(String),
}

/// Result type alias for JinjaError
pub type JinjaResult<T> = Result<T, JinjaError>;

impl From<minijinja::Error> for JinjaError {
    fn from(err: minijinja::Error) -> Self {
        // Include the source chain; minijinja nests the useful detail.
        let mut msg = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            msg.push_str(": ");
            msg.push_str(&cause.to_string());
            source = cause.source();
        }
        JinjaError::RenderError(msg)
    }
}
