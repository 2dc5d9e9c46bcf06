//! simple_bank - banking back-end
//!
//! Users hold accounts in a fixed set of currencies and move money between
//! them with atomic, deadlock-free transfers.
//!
//! # Modules
//!
//! - [`core_types`] - Ids, roles and currencies
//! - [`token`] - Encrypted (and JWT) access/refresh tokens
//! - [`user_auth`] - Users, passwords and refresh sessions
//! - [`api_auth`] - Per-call authorization gate
//! - [`account`] - Account ledger
//! - [`transfer`] - Transfer orchestrator
//! - [`store`] - Persistence (PostgreSQL and in-memory)
//! - [`rpc`] - Bank RPC service, validation and status mapping
//! - [`gateway`] - HTTP transport

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod db;
pub mod logging;

pub mod account;
pub mod api_auth;
pub mod store;
pub mod token;
pub mod transfer;
pub mod user_auth;

pub mod gateway;
pub mod rpc;

// Convenient re-exports at crate root
pub use core_types::{AccountId, Currency, EntryId, MinorUnits, Role, TransferId};
pub use rpc::{BankService, Code, RpcError};
pub use store::{MemoryStore, PgStore, Store, StoreError};
