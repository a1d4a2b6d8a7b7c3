//! Account Aggregate
//!
//! The single consistency boundary of the ledger. An Account is never stored
//! directly; it is rebuilt by folding its event log through the projector.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

use super::transaction::{Direction, MoneyTransaction, TransactionState};

/// Account state derived from an event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: Uuid,
    full_name: String,
    balance: Decimal,
    /// In-flight transfer amounts held outside the balance, keyed by
    /// transaction id. Negative on the issuer's side, positive on the
    /// receiver's.
    reservations: HashMap<Uuid, Decimal>,
    transactions: HashMap<Uuid, MoneyTransaction>,
    created_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            full_name: String::new(),
            balance: Decimal::ZERO,
            reservations: HashMap::new(),
            transactions: HashMap::new(),
            created_at: DateTime::UNIX_EPOCH,
            last_updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

impl Account {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn reservations(&self) -> &HashMap<Uuid, Decimal> {
        &self.reservations
    }

    pub fn transactions(&self) -> &HashMap<Uuid, MoneyTransaction> {
        &self.transactions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_updated_at(&self) -> DateTime<Utc> {
        self.last_updated_at
    }

    // Event handlers, called only by the projector fold.

    pub(super) fn create(
        &mut self,
        id: Uuid,
        full_name: String,
        opening_balance: Decimal,
        at: DateTime<Utc>,
    ) {
        self.id = id;
        self.full_name = full_name;
        self.balance = opening_balance;
        self.created_at = at;
        self.last_updated_at = at;
    }

    pub(super) fn rename(&mut self, full_name: String, at: DateTime<Utc>) {
        self.full_name = full_name;
        self.last_updated_at = at;
    }

    pub(super) fn record_transfer(
        &mut self,
        transaction_id: Uuid,
        from_id: Uuid,
        to_id: Uuid,
        amount: Decimal,
        at: DateTime<Utc>,
    ) {
        let direction = if self.id == from_id {
            Direction::Outgoing
        } else {
            Direction::Incoming
        };
        let value = match direction {
            Direction::Outgoing => -amount,
            Direction::Incoming => amount,
        };
        self.transactions.insert(
            transaction_id,
            MoneyTransaction::new(transaction_id, from_id, to_id, value, direction, at),
        );
        self.last_updated_at = at;
    }

    pub(super) fn debit(
        &mut self,
        transaction_id: Uuid,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.balance - amount < Decimal::ZERO {
            return Err(DomainError::InsufficientBalance {
                balance: self.balance,
                requested: amount,
            });
        }
        self.balance -= amount;
        self.reservations.insert(transaction_id, -amount);
        if let Some(tx) = self.transactions.get_mut(&transaction_id) {
            tx.transition(TransactionState::Pending, at);
        }
        self.last_updated_at = at;
        Ok(())
    }

    pub(super) fn credit(&mut self, transaction_id: Uuid, amount: Decimal, at: DateTime<Utc>) {
        self.reservations.insert(transaction_id, amount);
        if let Some(tx) = self.transactions.get_mut(&transaction_id) {
            tx.transition(TransactionState::Pending, at);
        }
        self.last_updated_at = at;
    }

    pub(super) fn complete_transfer(&mut self, transaction_id: Uuid, at: DateTime<Utc>) {
        let Some(tx) = self.transactions.get_mut(&transaction_id) else {
            tracing::warn!(%transaction_id, account_id = %self.id, "success for unknown transaction ignored");
            return;
        };
        if !tx.transition(TransactionState::Succeeded, at) {
            return;
        }
        let incoming = tx.direction() == Direction::Incoming;
        if let Some(reserved) = self.reservations.remove(&transaction_id) {
            // The issuer's balance was already decremented at debit time;
            // only the receiver gains the released reservation.
            if incoming {
                self.balance += reserved;
            }
        }
        self.last_updated_at = at;
    }

    pub(super) fn cancel_transfer(&mut self, transaction_id: Uuid, at: DateTime<Utc>) {
        let Some(tx) = self.transactions.get_mut(&transaction_id) else {
            tracing::warn!(%transaction_id, account_id = %self.id, "cancellation for unknown transaction ignored");
            return;
        };
        if !tx.transition(TransactionState::Cancelled, at) {
            return;
        }
        let incoming = tx.direction() == Direction::Incoming;
        if let Some(reserved) = self.reservations.remove(&transaction_id) {
            // Issuer reservations are negative; subtracting one restores the
            // debited amount. The receiver never gained anything, so its
            // reservation is simply dropped.
            if !incoming {
                self.balance -= reserved;
            }
        }
        self.last_updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn opened_account() -> (Account, Uuid) {
        let id = Uuid::new_v4();
        let mut account = Account::default();
        account.create(id, "Jane Doe".to_string(), dec!(1000.00), Utc::now());
        (account, id)
    }

    #[test]
    fn test_create_sets_opening_balance() {
        let (account, id) = opened_account();
        assert_eq!(account.id(), id);
        assert_eq!(account.full_name(), "Jane Doe");
        assert_eq!(account.balance(), dec!(1000.00));
        assert!(account.transactions().is_empty());
        assert!(account.reservations().is_empty());
    }

    #[test]
    fn test_debit_reserves_and_decrements() {
        let (mut account, id) = opened_account();
        let to_id = Uuid::new_v4();
        let tx_id = Uuid::new_v4();
        account.record_transfer(tx_id, id, to_id, dec!(25.01), Utc::now());
        account.debit(tx_id, dec!(25.01), Utc::now()).unwrap();

        assert_eq!(account.balance(), dec!(974.99));
        assert_eq!(account.reservations()[&tx_id], dec!(-25.01));
        assert_eq!(
            account.transactions()[&tx_id].state(),
            TransactionState::Pending
        );
    }

    #[test]
    fn test_debit_insufficient_balance_does_not_mutate() {
        let (mut account, id) = opened_account();
        let tx_id = Uuid::new_v4();
        account.record_transfer(tx_id, id, Uuid::new_v4(), dec!(2600.01), Utc::now());

        let err = account.debit(tx_id, dec!(2600.01), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientBalance { .. }));
        assert_eq!(account.balance(), dec!(1000.00));
        assert!(account.reservations().is_empty());
        assert_eq!(account.transactions()[&tx_id].state(), TransactionState::New);
    }

    #[test]
    fn test_complete_credits_receiver_only() {
        let from_id = Uuid::new_v4();
        let mut receiver = Account::default();
        let id = Uuid::new_v4();
        receiver.create(id, "Bob".to_string(), dec!(1000.00), Utc::now());
        let tx_id = Uuid::new_v4();
        receiver.record_transfer(tx_id, from_id, id, dec!(25.01), Utc::now());
        receiver.credit(tx_id, dec!(25.01), Utc::now());
        assert_eq!(receiver.balance(), dec!(1000.00));

        receiver.complete_transfer(tx_id, Utc::now());
        assert_eq!(receiver.balance(), dec!(1025.01));
        assert!(receiver.reservations().is_empty());
        assert_eq!(
            receiver.transactions()[&tx_id].state(),
            TransactionState::Succeeded
        );
    }

    #[test]
    fn test_cancel_restores_issuer_balance() {
        let (mut account, id) = opened_account();
        let tx_id = Uuid::new_v4();
        account.record_transfer(tx_id, id, Uuid::new_v4(), dec!(100.00), Utc::now());
        account.debit(tx_id, dec!(100.00), Utc::now()).unwrap();
        assert_eq!(account.balance(), dec!(900.00));

        account.cancel_transfer(tx_id, Utc::now());
        assert_eq!(account.balance(), dec!(1000.00));
        assert!(account.reservations().is_empty());
        assert_eq!(
            account.transactions()[&tx_id].state(),
            TransactionState::Cancelled
        );
    }

    #[test]
    fn test_cancel_on_receiver_drops_reservation_without_balance_change() {
        let from_id = Uuid::new_v4();
        let mut receiver = Account::default();
        let id = Uuid::new_v4();
        receiver.create(id, "Bob".to_string(), dec!(1000.00), Utc::now());
        let tx_id = Uuid::new_v4();
        receiver.record_transfer(tx_id, from_id, id, dec!(50.00), Utc::now());
        receiver.credit(tx_id, dec!(50.00), Utc::now());

        receiver.cancel_transfer(tx_id, Utc::now());
        assert_eq!(receiver.balance(), dec!(1000.00));
        assert!(receiver.reservations().is_empty());
    }

    #[test]
    fn test_terminal_transaction_is_not_reentered() {
        let (mut account, id) = opened_account();
        let tx_id = Uuid::new_v4();
        account.record_transfer(tx_id, id, Uuid::new_v4(), dec!(10.00), Utc::now());
        account.debit(tx_id, dec!(10.00), Utc::now()).unwrap();
        account.complete_transfer(tx_id, Utc::now());
        assert_eq!(account.balance(), dec!(990.00));

        // A late cancellation must not undo a succeeded transfer
        account.cancel_transfer(tx_id, Utc::now());
        assert_eq!(account.balance(), dec!(990.00));
        assert_eq!(
            account.transactions()[&tx_id].state(),
            TransactionState::Succeeded
        );
    }
}
