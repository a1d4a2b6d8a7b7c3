//! Common test utilities

use std::sync::Arc;
use std::sync::Once;

use bank_ledger::aggregate::Projector;
use bank_ledger::event_store::InMemoryEventStore;
use bank_ledger::handlers::{AccountService, CreateAccountCommand};
use bank_ledger::lock::LockManager;
use bank_ledger::Config;

static TRACING: Once = Once::new();

/// Fully wired ledger for one test.
pub struct TestLedger {
    pub service: Arc<AccountService>,
    pub store: Arc<InMemoryEventStore>,
    pub config: Config,
}

pub fn setup() -> TestLedger {
    setup_with(Config::default())
}

pub fn setup_with(config: Config) -> TestLedger {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "bank_ledger=warn".into()),
            )
            .with_test_writer()
            .try_init();
    });

    let store = Arc::new(InMemoryEventStore::new(Projector::new(
        config.opening_balance,
    )));
    let locks = Arc::new(LockManager::new(config.lock_timeout));
    let service = Arc::new(AccountService::new(Arc::clone(&store), locks));

    TestLedger {
        service,
        store,
        config,
    }
}

pub async fn create_account(ledger: &TestLedger, full_name: &str) -> uuid::Uuid {
    ledger
        .service
        .create_account(CreateAccountCommand::new(full_name))
        .await
        .expect("account creation failed")
}
