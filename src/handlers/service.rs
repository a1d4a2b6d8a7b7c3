//! Account Service
//!
//! Command intake for the ledger: validates each command, serializes access
//! to the touched aggregates, and feeds the first event of the operation
//! into the dispatcher.

use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::Account;
use crate::domain::{AccountEvent, Amount, EventPayload};
use crate::error::{AppError, AppResult};
use crate::event_store::{EventStoreError, InMemoryEventStore};
use crate::lock::LockManager;

use super::commands::{
    CancelTransactionCommand, ChangeFullNameCommand, CreateAccountCommand, TransferMoneyCommand,
    TransferResult,
};
use super::dispatcher::EventDispatcher;

/// Public command and query surface of the ledger core.
#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<InMemoryEventStore>,
    dispatcher: EventDispatcher,
    locks: Arc<LockManager>,
}

impl AccountService {
    pub fn new(store: Arc<InMemoryEventStore>, locks: Arc<LockManager>) -> Self {
        let dispatcher = EventDispatcher::new(Arc::clone(&store));
        Self {
            store,
            dispatcher,
            locks,
        }
    }

    /// Open a new account with the configured opening balance.
    pub async fn create_account(&self, command: CreateAccountCommand) -> AppResult<Uuid> {
        let full_name = non_empty_name(&command.full_name)?;

        // Fresh id, no contention possible: no lock needed
        let account_id = Uuid::new_v4();
        self.dispatcher
            .dispatch(AccountEvent::new(
                account_id,
                EventPayload::AccountCreated { full_name },
            ))
            .await?;
        Ok(account_id)
    }

    /// Change the holder name on an existing account.
    pub async fn change_full_name(&self, command: ChangeFullNameCommand) -> AppResult<()> {
        let full_name = non_empty_name(&command.full_name)?;
        self.require_exists(command.account_id).await?;

        let _guard = self.locks.acquire(&[command.account_id]).await?;
        self.dispatcher
            .dispatch(AccountEvent::new(
                command.account_id,
                EventPayload::FullNameChanged { full_name },
            ))
            .await
    }

    /// Start a money transfer saga.
    ///
    /// Returns once every involved aggregate has reached a terminal state
    /// for the transaction. Insufficient balance is not an error here: the
    /// saga records a cancellation on the issuer's log and this call still
    /// succeeds, leaving the outcome readable from the account history.
    pub async fn transfer_money(&self, command: TransferMoneyCommand) -> AppResult<TransferResult> {
        let amount: Amount = command
            .amount
            .parse()
            .map_err(|e| AppError::InvalidRequest(format!("Invalid amount: {e}")))?;

        if command.from_id == command.to_id {
            return Err(AppError::InvalidRequest(
                "Cannot transfer to the same account".to_string(),
            ));
        }
        self.require_exists(command.from_id).await?;
        self.require_exists(command.to_id).await?;

        // One lock over the sorted pair: opposite-direction transfers on the
        // same two accounts serialize instead of deadlocking.
        let _guard = self
            .locks
            .acquire(&[command.from_id, command.to_id])
            .await?;

        let transaction_id = Uuid::new_v4();
        self.dispatcher
            .dispatch(AccountEvent::new(
                command.from_id,
                EventPayload::MoneyTransferred {
                    transaction_id,
                    from_id: command.from_id,
                    to_id: command.to_id,
                    amount: amount.value(),
                },
            ))
            .await?;

        Ok(TransferResult {
            transaction_id,
            from_id: command.from_id,
            to_id: command.to_id,
            amount: amount.value(),
        })
    }

    /// Cancel one side of a transfer, routed through the normal dispatcher
    /// path so the compensation lands in the account's own history.
    pub async fn cancel_transaction(&self, command: CancelTransactionCommand) -> AppResult<()> {
        self.require_exists(command.aggregate_id).await?;

        let _guard = self.locks.acquire(&[command.aggregate_id]).await?;
        self.dispatcher
            .dispatch(AccountEvent::new(
                command.aggregate_id,
                EventPayload::MoneyTransferCancelled {
                    transaction_id: command.transaction_id,
                    reason: command.reason,
                },
            ))
            .await
    }

    // Query surface

    pub async fn get_account(&self, id: Uuid) -> AppResult<Account> {
        Ok(self.store.get(id).await?)
    }

    pub async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn exists(&self, id: Uuid) -> bool {
        self.store.exists(id).await
    }

    async fn require_exists(&self, id: Uuid) -> AppResult<()> {
        if self.store.exists(id).await {
            Ok(())
        } else {
            Err(EventStoreError::AggregateNotFound(id).into())
        }
    }
}

fn non_empty_name(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidRequest(
            "Full name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
