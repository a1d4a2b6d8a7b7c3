//! Scheduled Jobs
//!
//! Background maintenance for the ledger: the transaction rollback sweep
//! finds transfers that stalled mid-saga and issues compensating
//! cancellations through the normal command path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::interval;
use uuid::Uuid;

use crate::aggregate::{Direction, MoneyTransaction, TransactionState};
use crate::domain::CancellationReason;
use crate::event_store::InMemoryEventStore;
use crate::handlers::{AccountService, CancelTransactionCommand};

/// Report from one sweep pass.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Transactions older than the timeout threshold, grouped by id.
    pub stale_transactions: usize,
    pub cancellations_issued: usize,
    pub errors: Vec<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Finds transfers untouched for longer than the transaction timeout and
/// cancels their unresolved sides.
///
/// The two sides of a transfer live on independent logs, so stale
/// transactions must be grouped by transaction id across all accounts
/// before deciding what to cancel. The sweep never mutates aggregates
/// directly; every cancellation is a command routed through the service.
pub struct TransactionRollbackJob {
    service: Arc<AccountService>,
    store: Arc<InMemoryEventStore>,
    transaction_timeout: Duration,
}

impl TransactionRollbackJob {
    pub fn new(
        service: Arc<AccountService>,
        store: Arc<InMemoryEventStore>,
        transaction_timeout: Duration,
    ) -> Self {
        Self {
            service,
            store,
            transaction_timeout,
        }
    }

    /// Run one sweep pass.
    pub async fn run_once(&self) -> SweepReport {
        tracing::info!("transaction rollback sweep started");
        let mut report = SweepReport::default();

        let threshold = Utc::now()
            - chrono::Duration::from_std(self.transaction_timeout).unwrap_or(chrono::Duration::MAX);

        let accounts = match self.store.find_all().await {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::error!(error = %e, "sweep could not scan accounts");
                report.errors.push(e.to_string());
                report.completed_at = Some(Utc::now());
                return report;
            }
        };

        let stale = stale_by_transaction(&accounts, threshold);
        report.stale_transactions = stale.len();

        for (transaction_id, sides) in stale {
            for side in sides_to_cancel(&sides) {
                self.cancel(side, &mut report).await;
            }
            tracing::debug!(%transaction_id, "stale transaction processed");
        }

        report.completed_at = Some(Utc::now());
        tracing::info!(
            stale = report.stale_transactions,
            cancelled = report.cancellations_issued,
            "transaction rollback sweep finished"
        );
        report
    }

    async fn cancel(&self, side: &MoneyTransaction, report: &mut SweepReport) {
        let target = match side.direction() {
            Direction::Outgoing => side.from_id(),
            Direction::Incoming => side.to_id(),
        };
        tracing::info!(
            transaction_id = %side.transaction_id(),
            aggregate_id = %target,
            "cancelling stalled transaction side"
        );

        let command = CancelTransactionCommand::new(
            target,
            side.transaction_id(),
            CancellationReason::InternalTimeout,
        );
        match self.service.cancel_transaction(command).await {
            Ok(()) => report.cancellations_issued += 1,
            Err(e) => {
                tracing::error!(
                    transaction_id = %side.transaction_id(),
                    error = %e,
                    "sweep cancellation failed"
                );
                report.errors.push(e.to_string());
            }
        }
    }
}

/// Collect transactions last touched before `threshold`, grouped by
/// transaction id across every account.
fn stale_by_transaction(
    accounts: &[crate::aggregate::Account],
    threshold: DateTime<Utc>,
) -> HashMap<Uuid, Vec<MoneyTransaction>> {
    let mut grouped: HashMap<Uuid, Vec<MoneyTransaction>> = HashMap::new();
    for account in accounts {
        for tx in account.transactions().values() {
            if tx.last_updated_at() < threshold {
                grouped.entry(tx.transaction_id()).or_default().push(tx.clone());
            }
        }
    }
    grouped
}

/// Decide which sides of a stale transaction need a compensating
/// cancellation.
fn sides_to_cancel(sides: &[MoneyTransaction]) -> Vec<&MoneyTransaction> {
    match sides {
        // Only the issuer ever saw this transfer
        [side] => {
            if side.state() == TransactionState::Cancelled {
                Vec::new()
            } else {
                vec![side]
            }
        }
        [_, _] => {
            let both_in = |state: TransactionState| sides.iter().all(|tx| tx.state() == state);
            // Already fully resolved, one way or the other
            if both_in(TransactionState::Succeeded) || both_in(TransactionState::Cancelled) {
                return Vec::new();
            }
            sides
                .iter()
                .filter(|tx| tx.state() != TransactionState::Cancelled)
                .collect()
        }
        other => {
            tracing::warn!(
                count = other.len(),
                "unexpected number of sides for one transaction, skipping"
            );
            Vec::new()
        }
    }
}

/// Drives the rollback sweep on a fixed interval.
pub struct JobScheduler {
    job: TransactionRollbackJob,
    sweep_interval: Duration,
}

impl JobScheduler {
    pub fn new(job: TransactionRollbackJob, sweep_interval: Duration) -> Self {
        Self {
            job,
            sweep_interval,
        }
    }

    /// Start the scheduler in the background. Returns a handle that can be
    /// used to abort it.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!("job scheduler started");
            let mut ticker = interval(self.sweep_interval);
            loop {
                ticker.tick().await;
                let report = self.job.run_once().await;
                if !report.errors.is_empty() {
                    tracing::error!(errors = report.errors.len(), "sweep finished with errors");
                }
            }
        })
    }
}
