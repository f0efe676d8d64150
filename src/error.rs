use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Service(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        AppError::InvalidState(message.into())
    }

    /// True for rejections decided locally, before any service call.
    pub fn is_local(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::InvalidState(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
