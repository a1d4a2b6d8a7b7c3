//! Aggregate module
//!
//! Account aggregate and the pure projection fold that derives it from an
//! event log.

pub mod account;
pub mod transaction;

pub use account::Account;
pub use transaction::{Direction, MoneyTransaction, TransactionState};

use rust_decimal::Decimal;

use crate::domain::{AccountEvent, DomainError, EventPayload};

/// Pure fold from an ordered event sequence to account state.
///
/// Projection is deterministic: the only clock it ever consults is the
/// `created_at` carried by each event, so replaying the same prefix twice
/// yields identical state.
#[derive(Debug, Clone, Copy)]
pub struct Projector {
    opening_balance: Decimal,
}

impl Projector {
    pub fn new(opening_balance: Decimal) -> Self {
        Self { opening_balance }
    }

    /// Replay a full log into an account.
    ///
    /// # Errors
    /// `DomainError::InsufficientBalance` if a debit event would drive the
    /// balance negative; no further events are applied.
    pub fn project(&self, events: &[AccountEvent]) -> Result<Account, DomainError> {
        events
            .iter()
            .try_fold(Account::default(), |account, event| self.apply(account, event))
    }

    /// Apply a single event on top of existing state.
    pub fn apply(&self, mut account: Account, event: &AccountEvent) -> Result<Account, DomainError> {
        let at = event.created_at;
        match &event.payload {
            EventPayload::AccountCreated { full_name } => {
                account.create(event.aggregate_id, full_name.clone(), self.opening_balance, at);
            }
            EventPayload::FullNameChanged { full_name } => {
                account.rename(full_name.clone(), at);
            }
            EventPayload::MoneyTransferred {
                transaction_id,
                from_id,
                to_id,
                amount,
            } => {
                account.record_transfer(*transaction_id, *from_id, *to_id, *amount, at);
            }
            EventPayload::AccountDebited {
                transaction_id,
                amount,
            } => {
                account.debit(*transaction_id, *amount, at)?;
            }
            EventPayload::AccountCredited {
                transaction_id,
                amount,
            } => {
                account.credit(*transaction_id, *amount, at);
            }
            EventPayload::MoneyTransferSucceeded { transaction_id } => {
                account.complete_transfer(*transaction_id, at);
            }
            EventPayload::MoneyTransferCancelled { transaction_id, .. } => {
                account.cancel_transfer(*transaction_id, at);
            }
        }
        Ok(account)
    }
}
