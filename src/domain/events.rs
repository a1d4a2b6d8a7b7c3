//! Domain Events
//!
//! Event definitions for Event Sourcing.
//! Events are immutable facts appended to an account's log; the account's
//! current state is only ever derived by replaying them in order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Why a money transfer was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancellationReason {
    /// The issuer did not have enough balance for the debit.
    BalanceTooLow,

    /// The transfer did not complete within the timeout window and was
    /// rolled back by the sweep.
    InternalTimeout,
}

/// The payload of a domain event, one variant per event kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    /// Account was opened. Must be the first event on a log, exactly once.
    AccountCreated { full_name: String },

    /// Account holder's name was changed.
    FullNameChanged { full_name: String },

    /// A transfer touched this account. Recorded once on the issuer's log
    /// and once on the receiver's log, both carrying the same transaction id.
    MoneyTransferred {
        transaction_id: Uuid,
        from_id: Uuid,
        to_id: Uuid,
        amount: Decimal,
    },

    /// Funds were taken out of the issuer's balance and reserved.
    AccountDebited { transaction_id: Uuid, amount: Decimal },

    /// Funds were reserved for the receiver.
    AccountCredited { transaction_id: Uuid, amount: Decimal },

    /// The transfer reached its terminal success state on this log.
    MoneyTransferSucceeded { transaction_id: Uuid },

    /// The transfer was rolled back on this log.
    MoneyTransferCancelled {
        transaction_id: Uuid,
        reason: CancellationReason,
    },
}

/// A domain event targeted at a single aggregate's log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEvent {
    /// The account whose log this event belongs to.
    pub aggregate_id: Uuid,

    pub created_at: DateTime<Utc>,

    #[serde(flatten)]
    pub payload: EventPayload,
}

impl AccountEvent {
    /// Build an event stamped with the current time.
    pub fn new(aggregate_id: Uuid, payload: EventPayload) -> Self {
        Self {
            aggregate_id,
            created_at: Utc::now(),
            payload,
        }
    }

    /// Get the event type as a string.
    pub fn event_type(&self) -> &'static str {
        match self.payload {
            EventPayload::AccountCreated { .. } => "AccountCreated",
            EventPayload::FullNameChanged { .. } => "FullNameChanged",
            EventPayload::MoneyTransferred { .. } => "MoneyTransferred",
            EventPayload::AccountDebited { .. } => "AccountDebited",
            EventPayload::AccountCredited { .. } => "AccountCredited",
            EventPayload::MoneyTransferSucceeded { .. } => "MoneyTransferSucceeded",
            EventPayload::MoneyTransferCancelled { .. } => "MoneyTransferCancelled",
        }
    }

    /// The transaction this event belongs to, if it is transfer-related.
    pub fn transaction_id(&self) -> Option<Uuid> {
        match self.payload {
            EventPayload::MoneyTransferred { transaction_id, .. }
            | EventPayload::AccountDebited { transaction_id, .. }
            | EventPayload::AccountCredited { transaction_id, .. }
            | EventPayload::MoneyTransferSucceeded { transaction_id }
            | EventPayload::MoneyTransferCancelled { transaction_id, .. } => Some(transaction_id),
            EventPayload::AccountCreated { .. } | EventPayload::FullNameChanged { .. } => None,
        }
    }
}

// Equality deliberately ignores `created_at`: two events describing the same
// fact are the same event regardless of when they were stamped.
impl PartialEq for AccountEvent {
    fn eq(&self, other: &Self) -> bool {
        self.aggregate_id == other.aggregate_id && self.payload == other.payload
    }
}

impl Eq for AccountEvent {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_equality_ignores_created_at() {
        let aggregate_id = Uuid::new_v4();
        let transaction_id = Uuid::new_v4();
        let payload = EventPayload::AccountDebited {
            transaction_id,
            amount: dec!(25.01),
        };

        let mut a = AccountEvent::new(aggregate_id, payload.clone());
        let mut b = AccountEvent::new(aggregate_id, payload);
        a.created_at = Utc::now() - chrono::Duration::hours(1);
        b.created_at = Utc::now();

        assert_eq!(a, b);
    }

    #[test]
    fn test_different_payloads_are_not_equal() {
        let aggregate_id = Uuid::new_v4();
        let a = AccountEvent::new(
            aggregate_id,
            EventPayload::AccountCreated {
                full_name: "Jane Doe".to_string(),
            },
        );
        let b = AccountEvent::new(
            aggregate_id,
            EventPayload::FullNameChanged {
                full_name: "Jane Doe".to_string(),
            },
        );

        assert_ne!(a, b);
    }

    #[test]
    fn test_event_serialization() {
        let event = AccountEvent::new(
            Uuid::new_v4(),
            EventPayload::MoneyTransferCancelled {
                transaction_id: Uuid::new_v4(),
                reason: CancellationReason::BalanceTooLow,
            },
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("MoneyTransferCancelled"));
        assert!(json.contains("BALANCE_TOO_LOW"));

        let deserialized: AccountEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, deserialized);
    }

    #[test]
    fn test_transaction_id_accessor() {
        let transaction_id = Uuid::new_v4();
        let event = AccountEvent::new(
            Uuid::new_v4(),
            EventPayload::MoneyTransferSucceeded { transaction_id },
        );
        assert_eq!(event.transaction_id(), Some(transaction_id));

        let event = AccountEvent::new(
            Uuid::new_v4(),
            EventPayload::AccountCreated {
                full_name: "Jane Doe".to_string(),
            },
        );
        assert_eq!(event.transaction_id(), None);
    }
}
