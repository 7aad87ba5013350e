//! Error types for request validation and parameter derivation

use thiserror::Error;

/// Errors raised while turning a pipeline request into template parameters
#[derive(Debug, Error)]
pub enum ParamsError {
    /// The request is malformed: missing keys, unsupported pipeline type, etc.
    #[error("{0}")]
    BadRequest(String),

    #[error("No built-in image for framework '{framework}' in region '{region}'")]
    ImageLookup { framework: String, region: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl ParamsError {
    /// Shorthand for building a `BadRequest`
    pub fn bad_request(message: impl Into<String>) -> Self {
        ParamsError::BadRequest(message.into())
    }

    /// Check if this error came from the caller's request rather than the environment
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ParamsError::BadRequest(_))
    }
}

pub type Result<T> = std::result::Result<T, ParamsError>;
