//! Configuration error types.

use std::path::PathBuf;

/// Errors raised while building or loading [`Settings`](crate::Settings).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A numeric option is outside its accepted range.
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A parameter value could not be parsed.
    #[error("{field}: cannot parse {value:?}")]
    InvalidValue { field: String, value: String },

    /// A parameter name is not recognized.
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// Two options contradict each other.
    #[error("inconsistent settings: {0}")]
    Inconsistent(&'static str),

    /// Reading a settings file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings file is not valid JSON for [`Settings`](crate::Settings).
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
