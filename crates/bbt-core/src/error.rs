//! Error types for bbt-core

use thiserror::Error;

/// Core error type for BlockBT
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Project directory not found
    #[error("[E003] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E004: Model not found in the registry
    #[error("[E004] Model not found: {name}")]
    ModelNotFound { name: String },

    /// E005: Model file failed to parse into name + query + metadata
    #[error("[E005] Failed to parse model {name}: {message}")]
    ModelParseError { name: String, message: String },

    /// E006: Duplicate model name across model paths
    #[error("[E006] Duplicate model name: {name}")]
    DuplicateModel { name: String },

    /// E007: Circular dependency in the model graph
    #[error("[E007] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E008: A ref() points at a name absent from the registry
    #[error("[E008] Model '{model}' references unknown model '{reference}'")]
    UnresolvedReference { model: String, reference: String },

    /// E009: Malformed or unknown selector expression
    #[error("[E009] Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// E010: IO error
    #[error("[E010] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E011: Schema/YAML parse error
    #[error("[E011] Schema parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
