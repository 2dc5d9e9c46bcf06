//! Transactional data store
//!
//! The store is the only shared mutable state in the system and the only
//! synchronization point between concurrent calls. Two implementations:
//!
//! - [`PgStore`]: PostgreSQL through an `sqlx` pool
//! - [`MemoryStore`]: in-process tables with real async row locks, used by
//!   tests and by the server when no database is configured
//!
//! Single-row operations on [`Store`] run with single-statement atomicity.
//! Multi-row work goes through a [`TransferTx`] obtained from
//! [`Store::begin`]: row locks taken inside it are held until commit or
//! rollback, and dropping an uncommitted transaction rolls it back.

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::account::{Account, CreateAccountParams, CreateEntryParams, Entry, ListAccountsParams};
use crate::core_types::{AccountId, MinorUnits, TransferId};
use crate::transfer::{CreateTransferParams, Transfer};
use crate::user_auth::{CreateSessionParams, CreateUserParams, Session, User};

#[async_trait]
pub trait Store: Send + Sync {
    /// Store name for logging
    fn name(&self) -> &'static str;

    /// Cheap liveness probe
    async fn ping(&self) -> Result<(), StoreError>;

    // === Users ===

    async fn create_user(&self, params: CreateUserParams) -> Result<User, StoreError>;

    async fn get_user(&self, username: &str) -> Result<User, StoreError>;

    // === Sessions ===

    async fn create_session(&self, params: CreateSessionParams) -> Result<Session, StoreError>;

    async fn get_session(&self, id: Uuid) -> Result<Session, StoreError>;

    /// Mark a session blocked; later renewals with its refresh token fail
    async fn block_session(&self, id: Uuid) -> Result<Session, StoreError>;

    // === Accounts ===

    async fn create_account(&self, params: CreateAccountParams) -> Result<Account, StoreError>;

    async fn get_account(&self, id: AccountId) -> Result<Account, StoreError>;

    /// Accounts ordered by id
    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError>;

    /// Atomic single-row `balance = balance + amount`
    async fn add_account_balance(
        &self,
        id: AccountId,
        amount: MinorUnits,
    ) -> Result<Account, StoreError>;

    /// Delete the row matching both id and owner, `NotFound` if none does
    async fn delete_account(&self, id: AccountId, owner: &str) -> Result<(), StoreError>;

    // === Transfers & entries ===

    async fn get_transfer(&self, id: TransferId) -> Result<Transfer, StoreError>;

    /// Ledger history of one account, ordered by id
    async fn list_entries(&self, account_id: AccountId) -> Result<Vec<Entry>, StoreError>;

    // === Transactions ===

    async fn begin(&self) -> Result<Box<dyn TransferTx>, StoreError>;
}

/// Open multi-statement transaction.
///
/// Writes become visible to other callers only at [`TransferTx::commit`].
/// Dropping the transaction without committing discards every write and
/// releases every row lock.
#[async_trait]
pub trait TransferTx: Send {
    /// Take an exclusive row lock on the account, held until the transaction
    /// ends, and return its current state.
    async fn lock_account(&mut self, id: AccountId) -> Result<Account, StoreError>;

    /// `balance = balance + amount` inside the transaction
    async fn add_account_balance(
        &mut self,
        id: AccountId,
        amount: MinorUnits,
    ) -> Result<Account, StoreError>;

    async fn create_transfer(
        &mut self,
        params: CreateTransferParams,
    ) -> Result<Transfer, StoreError>;

    async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
