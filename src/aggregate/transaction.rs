//! Money transaction
//!
//! Per-account view of one side of a transfer. A transfer produces one of
//! these on the issuer's log and one on the receiver's log, joined only by a
//! shared transaction id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of one side of a transfer.
///
/// Transitions are monotonic: NEW -> PENDING -> {SUCCEEDED | CANCELLED},
/// or NEW -> CANCELLED when the debit is rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    New,
    Pending,
    Succeeded,
    Cancelled,
}

impl TransactionState {
    /// SUCCEEDED and CANCELLED are never left once reached.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionState::Succeeded | TransactionState::Cancelled)
    }
}

/// Whether this side of the transfer pays or receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// One account's record of a money transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyTransaction {
    transaction_id: Uuid,
    from_id: Uuid,
    to_id: Uuid,
    /// Signed: negative on the issuer's side, positive on the receiver's.
    value: Decimal,
    state: TransactionState,
    direction: Direction,
    created_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
}

impl MoneyTransaction {
    pub(crate) fn new(
        transaction_id: Uuid,
        from_id: Uuid,
        to_id: Uuid,
        value: Decimal,
        direction: Direction,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id,
            from_id,
            to_id,
            value,
            state: TransactionState::New,
            direction,
            created_at: at,
            last_updated_at: at,
        }
    }

    /// Move to the next state. Returns `false` without mutating when the
    /// transaction is already terminal, which keeps replay idempotent.
    pub(crate) fn transition(&mut self, next: TransactionState, at: DateTime<Utc>) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = next;
        self.last_updated_at = at;
        true
    }

    pub fn transaction_id(&self) -> Uuid {
        self.transaction_id
    }

    pub fn from_id(&self) -> Uuid {
        self.from_id
    }

    pub fn to_id(&self) -> Uuid {
        self.to_id
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated_at(&self) -> DateTime<Utc> {
        self.last_updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn transaction(state: TransactionState) -> MoneyTransaction {
        let mut tx = MoneyTransaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            dec!(-10.00),
            Direction::Outgoing,
            Utc::now(),
        );
        if state != TransactionState::New {
            tx.transition(state, Utc::now());
        }
        tx
    }

    #[test]
    fn test_transition_new_to_pending() {
        let mut tx = transaction(TransactionState::New);
        assert!(tx.transition(TransactionState::Pending, Utc::now()));
        assert_eq!(tx.state(), TransactionState::Pending);
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut tx = transaction(TransactionState::Succeeded);
        assert!(!tx.transition(TransactionState::Cancelled, Utc::now()));
        assert_eq!(tx.state(), TransactionState::Succeeded);

        let mut tx = transaction(TransactionState::Cancelled);
        assert!(!tx.transition(TransactionState::Succeeded, Utc::now()));
        assert_eq!(tx.state(), TransactionState::Cancelled);
    }

    #[test]
    fn test_transition_updates_timestamp() {
        let mut tx = transaction(TransactionState::New);
        let later = Utc::now() + chrono::Duration::seconds(5);
        tx.transition(TransactionState::Pending, later);
        assert_eq!(tx.last_updated_at(), later);
    }
}
