//! Event Store Errors

use uuid::Uuid;

use crate::domain::DomainError;

/// Errors that can occur in the event store.
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// No log exists for this aggregate. Appending anything other than
    /// `AccountCreated` to a missing log is an integrity violation, never a
    /// lazy-create.
    #[error("Aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// Replay of a stored log failed.
    #[error("Projection error: {0}")]
    Projection(#[from] DomainError),
}
