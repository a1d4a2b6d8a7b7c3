//! In-memory event store
//!
//! Thread-safe, per-aggregate ordered append log. Accounts are never stored;
//! every read replays the log through the projector.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::aggregate::{Account, Projector};
use crate::domain::{AccountEvent, EventPayload};

use super::error::EventStoreError;

/// Per-aggregate event log, shared across tasks.
#[derive(Debug, Clone)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<HashMap<Uuid, Vec<AccountEvent>>>>,
    projector: Projector,
}

impl InMemoryEventStore {
    pub fn new(projector: Projector) -> Self {
        Self {
            streams: Arc::new(RwLock::new(HashMap::new())),
            projector,
        }
    }

    /// Append an event to its aggregate's log, preserving insertion order
    /// under concurrent callers.
    ///
    /// A log is only ever created by an `AccountCreated` event; any other
    /// event aimed at a missing log fails with `AggregateNotFound` so that a
    /// dangling transaction can never land in storage without an owning
    /// account.
    pub async fn append(&self, event: AccountEvent) -> Result<(), EventStoreError> {
        let mut streams = self.streams.write().await;
        match streams.entry(event.aggregate_id) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().push(event);
            }
            Entry::Vacant(entry) => {
                if !matches!(event.payload, EventPayload::AccountCreated { .. }) {
                    return Err(EventStoreError::AggregateNotFound(event.aggregate_id));
                }
                entry.insert(vec![event]);
            }
        }
        Ok(())
    }

    pub async fn exists(&self, id: Uuid) -> bool {
        self.streams.read().await.contains_key(&id)
    }

    /// Replay one aggregate's log into its current state.
    pub async fn get(&self, id: Uuid) -> Result<Account, EventStoreError> {
        let streams = self.streams.read().await;
        let events = streams
            .get(&id)
            .ok_or(EventStoreError::AggregateNotFound(id))?;
        Ok(self.projector.project(events)?)
    }

    /// Replay every log. Each account is projected from its own snapshot of
    /// the log; aggregates mutated mid-scan simply show the state they had
    /// when their log was read.
    pub async fn find_all(&self) -> Result<Vec<Account>, EventStoreError> {
        let ids: Vec<Uuid> = self.streams.read().await.keys().copied().collect();
        let mut accounts = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(id).await {
                Ok(account) => accounts.push(account),
                // Logs are never deleted, but tolerate a miss anyway
                Err(EventStoreError::AggregateNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(accounts)
    }

    /// Raw copy of one aggregate's log, oldest first.
    pub async fn events(&self, id: Uuid) -> Result<Vec<AccountEvent>, EventStoreError> {
        let streams = self.streams.read().await;
        streams
            .get(&id)
            .cloned()
            .ok_or(EventStoreError::AggregateNotFound(id))
    }

    pub(crate) fn projector(&self) -> Projector {
        self.projector
    }
}
