//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error(transparent)]
    Engine(#[from] rangebook_core::EngineError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] rangebook_telemetry::TelemetryError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rangebook_core::LookupError> for AppError {
    fn from(err: rangebook_core::LookupError) -> Self {
        AppError::Engine(err.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
