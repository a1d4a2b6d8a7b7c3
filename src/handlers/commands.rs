//! Command definitions
//!
//! Commands represent intentions to change the ledger. The excluded request
//! layer builds these from inbound requests; the sweep builds cancellations
//! directly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::CancellationReason;

/// Open a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountCommand {
    pub full_name: String,
}

impl CreateAccountCommand {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }
}

/// Change an account holder's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeFullNameCommand {
    pub account_id: Uuid,
    pub full_name: String,
}

impl ChangeFullNameCommand {
    pub fn new(account_id: Uuid, full_name: impl Into<String>) -> Self {
        Self {
            account_id,
            full_name: full_name.into(),
        }
    }
}

/// Move money between two accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferMoneyCommand {
    pub from_id: Uuid,
    pub to_id: Uuid,
    /// Amount as a string for precise decimal parsing.
    pub amount: String,
}

impl TransferMoneyCommand {
    pub fn new(from_id: Uuid, to_id: Uuid, amount: impl Into<String>) -> Self {
        Self {
            from_id,
            to_id,
            amount: amount.into(),
        }
    }
}

/// Cancel one side of a transfer. Issued by the timeout sweep; also
/// available to embedders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelTransactionCommand {
    /// The account whose side of the transfer is being cancelled.
    pub aggregate_id: Uuid,
    pub transaction_id: Uuid,
    pub reason: CancellationReason,
}

impl CancelTransactionCommand {
    pub fn new(aggregate_id: Uuid, transaction_id: Uuid, reason: CancellationReason) -> Self {
        Self {
            aggregate_id,
            transaction_id,
            reason,
        }
    }
}

/// Result of an accepted transfer command. The outcome of the saga is
/// observable on the two accounts' transaction maps under `transaction_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    pub transaction_id: Uuid,
    pub from_id: Uuid,
    pub to_id: Uuid,
    pub amount: Decimal,
}
