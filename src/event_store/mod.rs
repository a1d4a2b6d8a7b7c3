//! Event Store module
//!
//! In-process persistence for Event Sourcing: one append-only event log per
//! aggregate, replayed on every read.

mod error;
mod store;

pub use error::EventStoreError;
pub use store::InMemoryEventStore;
