//! bank-ledger
//!
//! Event-sourced, in-process bank ledger. Account state is derived by
//! replaying an ordered log of immutable domain events; money transfers run
//! as an event-driven saga across the two involved accounts, with
//! compensating cancellation on failure or timeout.
//!
//! # Wiring
//! ```
//! use std::sync::Arc;
//! use bank_ledger::aggregate::Projector;
//! use bank_ledger::event_store::InMemoryEventStore;
//! use bank_ledger::handlers::AccountService;
//! use bank_ledger::lock::LockManager;
//! use bank_ledger::Config;
//!
//! let config = Config::default();
//! let store = Arc::new(InMemoryEventStore::new(Projector::new(config.opening_balance)));
//! let locks = Arc::new(LockManager::new(config.lock_timeout));
//! let service = AccountService::new(store, locks);
//! ```

pub mod aggregate;
pub mod config;
pub mod domain;
pub mod event_store;
pub mod handlers;
pub mod jobs;
pub mod lock;

mod error;

pub use config::{Config, ConfigError};
pub use error::{AppError, AppResult};

pub use domain::{AccountEvent, Amount, AmountError, CancellationReason, DomainError, EventPayload};
pub use handlers::AccountService;
