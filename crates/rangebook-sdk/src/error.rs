//! SDK error types.

use rangebook_core::{EngineError, LookupError};
use thiserror::Error;

/// Failure reported by a [`ContractsApi`](crate::ContractsApi) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl SubmitError {
    /// A rejected transaction stays rejected; transport failures may clear.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Transport(_))
    }
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Submission failed: {0}")]
    Submit(#[from] SubmitError),
}

impl From<LookupError> for SdkError {
    fn from(err: LookupError) -> Self {
        SdkError::Engine(EngineError::LookupFailure(err))
    }
}

impl SdkError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Engine(e) => e.is_retryable(),
            SdkError::Submit(e) => e.is_retryable(),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
