//! Atomic money transfers
//!
//! A transfer debits one account, credits another, and records one
//! transfer row plus two entries, all in one store transaction.
//!
//! # Safety Invariants
//!
//! 1. **Ascending lock order**: both account rows are locked in ascending id
//!    order whichever side is the sender, so opposite-direction transfers
//!    between the same pair cannot deadlock
//! 2. **All or nothing**: the four writes commit together or not at all
//! 3. **Zero sum**: the two entries are `-amount` and `+amount`

pub mod error;
pub mod orchestrator;
pub mod types;

pub use error::TransferError;
pub use orchestrator::TransferOrchestrator;
pub use types::{
    CreateTransferParams, Transfer, TransferRequest, TransferTxParams, TransferTxResult, lock_order,
};
