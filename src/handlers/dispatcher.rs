//! Event Dispatcher
//!
//! The saga orchestrator for the transfer protocol. Every persisted event may
//! trigger follow-up events; the dispatcher drains them through an explicit
//! queue until each involved aggregate has reached a terminal state for the
//! transfer. It holds no state of its own — saga state is whatever the two
//! accounts' transaction maps say it is.

use std::collections::VecDeque;
use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::Projector;
use crate::domain::{AccountEvent, CancellationReason, DomainError, EventPayload};
use crate::error::{AppError, AppResult};
use crate::event_store::InMemoryEventStore;

/// Reacts to each persisted event and emits the next event(s) of the
/// transfer protocol, including compensation on failure.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    store: Arc<InMemoryEventStore>,
    projector: Projector,
}

impl EventDispatcher {
    pub fn new(store: Arc<InMemoryEventStore>) -> Self {
        let projector = store.projector();
        Self { store, projector }
    }

    /// Feed one event into the pipeline and run its reaction chain to
    /// completion on the calling task.
    pub async fn dispatch(&self, event: AccountEvent) -> AppResult<()> {
        let mut queue = VecDeque::new();
        queue.push_back(event);

        while let Some(event) = queue.pop_front() {
            tracing::info!(
                event_type = event.event_type(),
                aggregate_id = %event.aggregate_id,
                "received event"
            );
            queue.extend(self.react(event).await?);
        }
        Ok(())
    }

    /// Persist one event and return the follow-up events it triggers.
    async fn react(&self, event: AccountEvent) -> AppResult<Vec<AccountEvent>> {
        match event.payload.clone() {
            EventPayload::AccountCreated { .. } | EventPayload::FullNameChanged { .. } => {
                self.store.append(event).await?;
                Ok(Vec::new())
            }

            EventPayload::MoneyTransferred {
                transaction_id,
                from_id,
                amount,
                ..
            } => {
                // The issuer's copy starts the saga; the receiver's copy,
                // written during the debit reaction, is a plain record.
                let issuer_side = event.aggregate_id == from_id;
                self.store.append(event).await?;
                if issuer_side {
                    Ok(vec![AccountEvent::new(
                        from_id,
                        EventPayload::AccountDebited {
                            transaction_id,
                            amount,
                        },
                    )])
                } else {
                    Ok(Vec::new())
                }
            }

            EventPayload::AccountDebited {
                transaction_id,
                amount,
            } => {
                let issuer_id = event.aggregate_id;
                let issuer = self.store.get(issuer_id).await?;

                // Trial-apply before the event ever reaches the log: a
                // rejected debit leaves no trace beyond the cancellation.
                let issuer = match self.projector.apply(issuer, &event) {
                    Ok(updated) => updated,
                    Err(DomainError::InsufficientBalance { balance, requested }) => {
                        tracing::info!(
                            %transaction_id,
                            %balance,
                            %requested,
                            "debit rejected, cancelling transfer on issuer only"
                        );
                        return Ok(vec![AccountEvent::new(
                            issuer_id,
                            EventPayload::MoneyTransferCancelled {
                                transaction_id,
                                reason: CancellationReason::BalanceTooLow,
                            },
                        )]);
                    }
                };

                let to_id = issuer
                    .transactions()
                    .get(&transaction_id)
                    .map(|tx| tx.to_id())
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "debited transaction {transaction_id} missing from issuer {issuer_id}"
                        ))
                    })?;

                self.store.append(event).await?;
                Ok(vec![
                    // The receiver gets its own self-contained record of the
                    // transfer before any credit lands on its log.
                    AccountEvent::new(
                        to_id,
                        EventPayload::MoneyTransferred {
                            transaction_id,
                            from_id: issuer_id,
                            to_id,
                            amount,
                        },
                    ),
                    AccountEvent::new(
                        to_id,
                        EventPayload::AccountCredited {
                            transaction_id,
                            amount,
                        },
                    ),
                ])
            }

            EventPayload::AccountCredited { transaction_id, .. } => {
                self.store.append(event.clone()).await?;

                let receiver = self.store.get(event.aggregate_id).await?;
                let tx = receiver
                    .transactions()
                    .get(&transaction_id)
                    .ok_or_else(|| {
                        AppError::Internal(format!(
                            "credited transaction {transaction_id} missing from receiver {}",
                            event.aggregate_id
                        ))
                    })?;

                // Each account projects its own copy of the transaction, so
                // success is confirmed once per side.
                Ok(vec![
                    AccountEvent::new(
                        tx.from_id(),
                        EventPayload::MoneyTransferSucceeded { transaction_id },
                    ),
                    AccountEvent::new(
                        tx.to_id(),
                        EventPayload::MoneyTransferSucceeded { transaction_id },
                    ),
                ])
            }

            EventPayload::MoneyTransferSucceeded { transaction_id }
            | EventPayload::MoneyTransferCancelled { transaction_id, .. } => {
                if self.is_terminal(event.aggregate_id, transaction_id).await? {
                    tracing::debug!(
                        %transaction_id,
                        aggregate_id = %event.aggregate_id,
                        "transaction already terminal, skipping"
                    );
                    return Ok(Vec::new());
                }
                self.store.append(event).await?;
                Ok(Vec::new())
            }
        }
    }

    async fn is_terminal(&self, aggregate_id: Uuid, transaction_id: Uuid) -> AppResult<bool> {
        let account = self.store.get(aggregate_id).await?;
        Ok(account
            .transactions()
            .get(&transaction_id)
            .map(|tx| tx.state().is_terminal())
            .unwrap_or(false))
    }
}
