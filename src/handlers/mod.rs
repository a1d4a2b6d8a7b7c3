//! Command Handlers module
//!
//! Command intake and the event-driven saga pipeline.

mod commands;
mod dispatcher;
mod service;

pub use commands::{
    CancelTransactionCommand, ChangeFullNameCommand, CreateAccountCommand, TransferMoneyCommand,
    TransferResult,
};
pub use dispatcher::EventDispatcher;
pub use service::AccountService;
