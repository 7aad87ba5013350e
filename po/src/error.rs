//! Orchestrator error types

use pipelineparams::ParamsError;
use thiserror::Error;

/// Errors raised while handling an API or direct invocation
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The caller sent something we cannot act on
    #[error("{0}")]
    BadRequest(String),

    /// An AWS API call failed
    #[error("{operation} failed with {code} ({status}): {message}")]
    Service {
        operation: String,
        status: u16,
        code: String,
        message: String,
    },

    #[error(transparent)]
    Params(ParamsError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl OrchestratorError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        OrchestratorError::BadRequest(message.into())
    }

    /// HTTP status reported to the caller
    pub fn status_code(&self) -> u16 {
        match self {
            OrchestratorError::BadRequest(_) => 400,
            OrchestratorError::Service { status, .. } => *status,
            _ => 500,
        }
    }

    /// CloudFormation refused a create because the stack exists
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            OrchestratorError::Service { code, message, .. }
                if code == "AlreadyExistsException" || message.contains("already exists")
        )
    }

    /// CloudFormation refused an update because nothing changed
    pub fn is_no_updates(&self) -> bool {
        matches!(
            self,
            OrchestratorError::Service { message, .. } if message.contains("No updates are to be performed")
        )
    }
}

impl From<ParamsError> for OrchestratorError {
    fn from(err: ParamsError) -> Self {
        match err {
            ParamsError::BadRequest(message) => OrchestratorError::BadRequest(message),
            other => OrchestratorError::Params(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
