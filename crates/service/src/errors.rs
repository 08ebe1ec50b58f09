use std::time::Duration;

use thiserror::Error;

/// Failure of an external collaborator (listing directory or review source).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
    #[error("source timed out after {0:?}")]
    Timeout(Duration),
    #[error("source returned status {0}")]
    Status(u16),
    #[error("decode error: {0}")]
    Decode(String),
}

impl SourceError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            SourceError::Unavailable(_) => 2001,
            SourceError::Timeout(_) => 2002,
            SourceError::Status(_) => 2003,
            SourceError::Decode(_) => 2004,
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
    #[error("metrics error: {0}")]
    Metrics(String),
}
