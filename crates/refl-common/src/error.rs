//! Error types for reflectance processing.

use thiserror::Error;

/// Result type alias using ReflError.
pub type ReflResult<T> = Result<T, ReflError>;

/// Primary error type for reflectance extraction and band processing.
#[derive(Debug, Error)]
pub enum ReflError {
    // === Container structure ===
    /// The container does not follow the expected reflectance layout.
    #[error("Schema error: {0}")]
    Schema(String),

    // === Caller input ===
    #[error("Band {band} out of range [1, {band_count}]")]
    BandOutOfRange { band: usize, band_count: usize },

    #[error("Shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    #[error("Invalid configuration: {0}")]
    Config(String),

    // === Backend ===
    /// The container backend failed for a reason unrelated to the schema.
    #[error("Container error: {0}")]
    Container(String),
}

impl ReflError {
    /// Create a Schema error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Schema error for a required value that is absent at `path`.
    pub fn missing(field: &str, path: &str) -> Self {
        Self::Schema(format!("missing {} at '{}'", field, path))
    }

    /// Schema error for a value that exists but cannot be coerced.
    pub fn invalid(field: &str, path: &str, detail: impl std::fmt::Display) -> Self {
        Self::Schema(format!("invalid {} at '{}': {}", field, path, detail))
    }

    /// Create a ShapeMismatch error from two array shapes.
    pub fn shape_mismatch(left: &[usize], right: &[usize]) -> Self {
        Self::ShapeMismatch {
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }

    /// Create a Container error.
    pub fn container(msg: impl Into<String>) -> Self {
        Self::Container(msg.into())
    }

    pub fn is_schema(&self) -> bool {
        matches!(self, ReflError::Schema(_))
    }
}

impl From<std::io::Error> for ReflError {
    fn from(err: std::io::Error) -> Self {
        ReflError::Container(err.to_string())
    }
}

impl From<serde_json::Error> for ReflError {
    fn from(err: serde_json::Error) -> Self {
        ReflError::Container(format!("JSON error: {}", err))
    }
}
