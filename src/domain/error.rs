//! Domain errors
//!
//! Business-rule failures surfaced by the projection fold.

use rust_decimal::Decimal;

/// Errors raised while applying events to an account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// A debit would drive the balance below zero. The fold aborts without
    /// mutating the account; the orchestrator turns this into a
    /// `MoneyTransferCancelled` event rather than letting it escape.
    #[error("Insufficient balance: have {balance}, debit of {requested} rejected")]
    InsufficientBalance { balance: Decimal, requested: Decimal },
}
