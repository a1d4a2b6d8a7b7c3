//! Aggregate lock manager
//!
//! "Read projection, decide, append" is not atomic, so every mutation of an
//! aggregate is serialized behind a semaphore keyed by the sorted tuple of
//! account ids the operation touches. Sorting the key means two
//! opposite-direction transfers over the same pair contend on one semaphore
//! instead of deadlocking on two.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

/// Lock acquisition failures.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// Contention outlasted the configured wait. Retryable by the caller;
    /// the core never retries on its own.
    #[error("Timed out waiting for aggregate lock {key}")]
    Timeout { key: String },

    #[error("Aggregate lock was closed")]
    Closed,
}

/// Held lock over a set of aggregate ids. Dropping the guard releases the
/// lock on every exit path, panics included.
#[derive(Debug)]
pub struct LockGuard {
    _permit: OwnedSemaphorePermit,
}

/// Maps sorted id tuples to binary semaphores.
#[derive(Debug)]
pub struct LockManager {
    semaphores: Mutex<HashMap<String, Arc<Semaphore>>>,
    timeout: Duration,
}

impl LockManager {
    pub fn new(timeout: Duration) -> Self {
        Self {
            semaphores: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Acquire the lock for the given aggregate ids, waiting at most the
    /// configured timeout.
    pub async fn acquire(&self, ids: &[Uuid]) -> Result<LockGuard, LockError> {
        let key = lock_key(ids);
        let semaphore = {
            let mut semaphores = self.semaphores.lock().await;
            Arc::clone(
                semaphores
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Semaphore::new(1))),
            )
        };

        let permit = tokio::time::timeout(self.timeout, semaphore.acquire_owned())
            .await
            .map_err(|_| {
                tracing::warn!(%key, "aggregate lock acquisition timed out");
                LockError::Timeout { key: key.clone() }
            })?
            .map_err(|_| LockError::Closed)?;

        tracing::trace!(%key, "aggregate lock acquired");
        Ok(LockGuard { _permit: permit })
    }
}

fn lock_key(ids: &[Uuid]) -> String {
    let mut sorted: Vec<Uuid> = ids.to_vec();
    sorted.sort();
    sorted
        .iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(":")
}
