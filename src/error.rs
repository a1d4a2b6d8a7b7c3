//! Error handling module
//!
//! Centralized error types for the ledger core.

use crate::config::ConfigError;
use crate::domain::DomainError;
use crate::event_store::EventStoreError;
use crate::lock::LockError;

/// Application-wide Result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Command failed validation before reaching the core.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    EventStore(#[from] EventStoreError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Integrity violation inside the saga, such as a transfer event whose
    /// transaction is missing from its own aggregate's projection.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the caller may retry the failed operation. Lock contention
    /// is the only retryable failure; everything else is either a business
    /// outcome or an integrity violation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Lock(LockError::Timeout { .. }))
    }
}
