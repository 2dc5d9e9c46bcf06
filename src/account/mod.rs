//! Account ledger module
//!
//! Account rows, their ledger entries, and single-row balance access.

pub mod ledger;
pub mod models;

pub use ledger::AccountLedger;
pub use models::{Account, CreateAccountParams, CreateEntryParams, Entry, ListAccountsParams};
