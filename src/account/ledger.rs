//! Single-row account operations
//!
//! Each call is one atomic store statement. Multi-account work belongs to
//! the transfer orchestrator and its transaction.

use std::sync::Arc;

use super::models::{Account, CreateAccountParams, Entry, ListAccountsParams};
use crate::core_types::{AccountId, Currency, MinorUnits};
use crate::store::{Store, StoreError};

#[derive(Clone)]
pub struct AccountLedger {
    store: Arc<dyn Store>,
}

impl AccountLedger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Open an account with a zero balance
    pub async fn open(&self, owner: &str, currency: Currency) -> Result<Account, StoreError> {
        let account = self
            .store
            .create_account(CreateAccountParams {
                owner: owner.to_string(),
                balance: 0,
                currency,
            })
            .await?;

        tracing::info!(account_id = account.id, owner = %owner, currency = %currency, "Account opened");
        Ok(account)
    }

    pub async fn get(&self, id: AccountId) -> Result<Account, StoreError> {
        self.store.get_account(id).await
    }

    /// `owner = None` lists every owner's accounts
    pub async fn list(
        &self,
        owner: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Account>, StoreError> {
        self.store
            .list_accounts(ListAccountsParams {
                owner: owner.map(str::to_string),
                limit,
                offset,
            })
            .await
    }

    /// Administrative adjustment, `balance = balance + delta`
    pub async fn add_balance(
        &self,
        id: AccountId,
        delta: MinorUnits,
    ) -> Result<Account, StoreError> {
        let account = self.store.add_account_balance(id, delta).await?;
        tracing::info!(account_id = id, delta, balance = account.balance, "Balance adjusted");
        Ok(account)
    }

    /// Delete the account only if `owner` matches the stored owner
    pub async fn delete(&self, id: AccountId, owner: &str) -> Result<(), StoreError> {
        self.store.delete_account(id, owner).await?;
        tracing::info!(account_id = id, owner = %owner, "Account deleted");
        Ok(())
    }

    pub async fn entries(&self, id: AccountId) -> Result<Vec<Entry>, StoreError> {
        self.store.list_entries(id).await
    }
}
