//! In-memory store
//!
//! Same observable semantics as [`PgStore`](super::PgStore) for everything
//! the services rely on:
//!
//! - every account row has an async exclusive lock; a [`TransferTx`] holds
//!   the locks it takes until commit or drop, so two transactions locking
//!   the same pair in opposite order really deadlock
//! - transaction writes are buffered and applied in one step at commit;
//!   dropping the transaction discards them
//! - id sequences are not transactional (a rolled-back insert burns an id)
//!
//! The table mutex is a plain `std::sync::Mutex` and is never held across
//! an `.await`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};
use uuid::Uuid;

use super::{Store, StoreError, TransferTx};
use crate::account::{Account, CreateAccountParams, CreateEntryParams, Entry, ListAccountsParams};
use crate::core_types::{AccountId, MinorUnits, TransferId};
use crate::transfer::{CreateTransferParams, Transfer};
use crate::user_auth::{CreateSessionParams, CreateUserParams, Session, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<String, User>,
    sessions: HashMap<Uuid, Session>,
    accounts: BTreeMap<AccountId, Account>,
    transfers: BTreeMap<TransferId, Transfer>,
    entries: BTreeMap<i64, Entry>,
    row_locks: HashMap<AccountId, Arc<RowLock<()>>>,
}

impl Tables {
    fn account_in_use(&self, id: AccountId) -> bool {
        self.entries.values().any(|e| e.account_id == id)
            || self
                .transfers
                .values()
                .any(|t| t.from_account_id == id || t.to_account_id == id)
    }
}

struct Inner {
    tables: Mutex<Tables>,
    account_seq: AtomicI64,
    transfer_seq: AtomicI64,
    entry_seq: AtomicI64,
}

/// Process-local [`Store`]
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: Mutex::new(Tables::default()),
                account_seq: AtomicI64::new(1),
                transfer_seq: AtomicI64::new(1),
                entry_seq: AtomicI64::new(1),
            }),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        lock_tables(&self.inner)
    }

    fn row_lock(&self, id: AccountId) -> Result<Arc<RowLock<()>>, StoreError> {
        row_lock(&self.inner, id)
    }
}

fn lock_tables(inner: &Inner) -> MutexGuard<'_, Tables> {
    // A panic while holding the guard cannot leave a half-applied write:
    // every mutation is validated before the first table is touched.
    inner.tables.lock().unwrap_or_else(PoisonError::into_inner)
}

fn row_lock(inner: &Inner, id: AccountId) -> Result<Arc<RowLock<()>>, StoreError> {
    let mut tables = lock_tables(inner);
    if !tables.accounts.contains_key(&id) {
        return Err(StoreError::NotFound);
    }
    Ok(tables.row_locks.entry(id).or_default().clone())
}

fn apply_delta(balance: MinorUnits, delta: MinorUnits) -> Result<MinorUnits, StoreError> {
    balance
        .checked_add(delta)
        .ok_or_else(|| StoreError::Database("bigint out of range".to_string()))
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_user(&self, params: CreateUserParams) -> Result<User, StoreError> {
        let mut tables = self.tables();
        if tables.users.contains_key(&params.username) {
            return Err(StoreError::UniqueViolation("users_pkey".to_string()));
        }
        if tables.users.values().any(|u| u.email == params.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            username: params.username,
            role: params.role,
            hashed_password: params.hashed_password,
            full_name: params.full_name,
            email: params.email,
            password_changed_at: now,
            created_at: now,
        };
        tables.users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, username: &str) -> Result<User, StoreError> {
        self.tables()
            .users
            .get(username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_session(&self, params: CreateSessionParams) -> Result<Session, StoreError> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&params.username) {
            return Err(StoreError::ForeignKeyViolation(
                "sessions_username_fkey".to_string(),
            ));
        }
        if tables.sessions.contains_key(&params.id) {
            return Err(StoreError::UniqueViolation("sessions_pkey".to_string()));
        }

        let session = Session {
            id: params.id,
            username: params.username,
            refresh_token: params.refresh_token,
            user_agent: params.user_agent,
            client_ip: params.client_ip,
            is_blocked: params.is_blocked,
            expires_at: params.expires_at,
            created_at: Utc::now(),
        };
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: Uuid) -> Result<Session, StoreError> {
        self.tables()
            .sessions
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn block_session(&self, id: Uuid) -> Result<Session, StoreError> {
        let mut tables = self.tables();
        let session = tables.sessions.get_mut(&id).ok_or(StoreError::NotFound)?;
        session.is_blocked = true;
        Ok(session.clone())
    }

    async fn create_account(&self, params: CreateAccountParams) -> Result<Account, StoreError> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&params.owner) {
            return Err(StoreError::ForeignKeyViolation(
                "accounts_owner_fkey".to_string(),
            ));
        }
        if tables
            .accounts
            .values()
            .any(|a| a.owner == params.owner && a.currency == params.currency)
        {
            return Err(StoreError::UniqueViolation("owner_currency_key".to_string()));
        }

        let account = Account {
            id: self.inner.account_seq.fetch_add(1, Ordering::Relaxed),
            owner: params.owner,
            balance: params.balance,
            currency: params.currency,
            created_at: Utc::now(),
        };
        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, StoreError> {
        self.tables()
            .accounts
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> Result<Vec<Account>, StoreError> {
        let tables = self.tables();
        Ok(tables
            .accounts
            .values()
            .filter(|a| params.owner.as_deref().is_none_or(|owner| a.owner == owner))
            .skip(params.offset.max(0) as usize)
            .take(params.limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn add_account_balance(
        &self,
        id: AccountId,
        amount: MinorUnits,
    ) -> Result<Account, StoreError> {
        let lock = self.row_lock(id)?;
        let _row = lock.lock().await;

        let mut tables = self.tables();
        let account = tables.accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.balance = apply_delta(account.balance, amount)?;
        Ok(account.clone())
    }

    async fn delete_account(&self, id: AccountId, owner: &str) -> Result<(), StoreError> {
        let lock = self.row_lock(id)?;
        let _row = lock.lock().await;

        let mut tables = self.tables();
        match tables.accounts.get(&id) {
            Some(account) if account.owner == owner => {}
            _ => return Err(StoreError::NotFound),
        }
        if tables.account_in_use(id) {
            return Err(StoreError::ForeignKeyViolation(
                "entries_account_id_fkey".to_string(),
            ));
        }
        tables.accounts.remove(&id);
        tables.row_locks.remove(&id);
        Ok(())
    }

    async fn get_transfer(&self, id: TransferId) -> Result<Transfer, StoreError> {
        self.tables()
            .transfers
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_entries(&self, account_id: AccountId) -> Result<Vec<Entry>, StoreError> {
        Ok(self
            .tables()
            .entries
            .values()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn TransferTx>, StoreError> {
        Ok(Box::new(MemoryTransferTx {
            inner: self.inner.clone(),
            held: BTreeMap::new(),
            deltas: BTreeMap::new(),
            transfers: Vec::new(),
            entries: Vec::new(),
        }))
    }
}

/// Buffered transaction over a [`MemoryStore`]
pub struct MemoryTransferTx {
    inner: Arc<Inner>,
    held: BTreeMap<AccountId, OwnedMutexGuard<()>>,
    deltas: BTreeMap<AccountId, MinorUnits>,
    transfers: Vec<Transfer>,
    entries: Vec<Entry>,
}

impl MemoryTransferTx {
    /// Committed row plus this transaction's pending delta
    fn view(&self, id: AccountId) -> Result<Account, StoreError> {
        let tables = lock_tables(&self.inner);
        let mut account = tables.accounts.get(&id).cloned().ok_or(StoreError::NotFound)?;
        if let Some(delta) = self.deltas.get(&id) {
            account.balance = apply_delta(account.balance, *delta)?;
        }
        Ok(account)
    }

    fn check_account_exists(&self, id: AccountId, constraint: &str) -> Result<(), StoreError> {
        if lock_tables(&self.inner).accounts.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::ForeignKeyViolation(constraint.to_string()))
        }
    }
}

#[async_trait]
impl TransferTx for MemoryTransferTx {
    async fn lock_account(&mut self, id: AccountId) -> Result<Account, StoreError> {
        if !self.held.contains_key(&id) {
            let lock = row_lock(&self.inner, id)?;
            let guard = lock.lock_owned().await;
            self.held.insert(id, guard);
        }
        // The row may have been deleted while we waited for its lock
        self.view(id)
    }

    async fn add_account_balance(
        &mut self,
        id: AccountId,
        amount: MinorUnits,
    ) -> Result<Account, StoreError> {
        // An UPDATE locks the row implicitly
        self.lock_account(id).await?;

        let pending = self.deltas.get(&id).copied().unwrap_or(0);
        let updated = apply_delta(pending, amount)?;
        let account = {
            let mut account = self.view(id)?;
            account.balance = apply_delta(account.balance, amount)?;
            account
        };
        self.deltas.insert(id, updated);
        Ok(account)
    }

    async fn create_transfer(
        &mut self,
        params: CreateTransferParams,
    ) -> Result<Transfer, StoreError> {
        if params.amount <= 0 {
            return Err(StoreError::Database(
                "new row violates check constraint \"transfers_amount_check\"".to_string(),
            ));
        }
        self.check_account_exists(params.from_account_id, "transfers_from_account_id_fkey")?;
        self.check_account_exists(params.to_account_id, "transfers_to_account_id_fkey")?;

        let transfer = Transfer {
            id: self.inner.transfer_seq.fetch_add(1, Ordering::Relaxed),
            from_account_id: params.from_account_id,
            to_account_id: params.to_account_id,
            amount: params.amount,
            created_at: Utc::now(),
        };
        self.transfers.push(transfer.clone());
        Ok(transfer)
    }

    async fn create_entry(&mut self, params: CreateEntryParams) -> Result<Entry, StoreError> {
        self.check_account_exists(params.account_id, "entries_account_id_fkey")?;

        let entry = Entry {
            id: self.inner.entry_seq.fetch_add(1, Ordering::Relaxed),
            account_id: params.account_id,
            amount: params.amount,
            created_at: Utc::now(),
        };
        self.entries.push(entry.clone());
        Ok(entry)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        let mut tables = lock_tables(&this.inner);

        let mut balances = Vec::with_capacity(this.deltas.len());
        for (id, delta) in &this.deltas {
            let account = tables.accounts.get(id).ok_or(StoreError::NotFound)?;
            balances.push((*id, apply_delta(account.balance, *delta)?));
        }

        for (id, balance) in balances {
            if let Some(account) = tables.accounts.get_mut(&id) {
                account.balance = balance;
            }
        }
        for transfer in this.transfers {
            tables.transfers.insert(transfer.id, transfer);
        }
        for entry in this.entries {
            tables.entries.insert(entry.id, entry);
        }
        drop(tables);

        // Row locks release here, after the writes are visible
        drop(this.held);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{Currency, Role};
    use std::time::Duration;

    async fn seed(store: &MemoryStore, owner: &str) -> Account {
        store
            .create_user(CreateUserParams {
                username: owner.to_string(),
                role: Role::Depositor,
                hashed_password: "hash".to_string(),
                full_name: "Test User".to_string(),
                email: format!("{}@example.com", owner),
            })
            .await
            .unwrap();
        store
            .create_account(CreateAccountParams {
                owner: owner.to_string(),
                balance: 100,
                currency: Currency::USD,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_user_and_currency_are_unique_violations() {
        let store = MemoryStore::new();
        seed(&store, "alice").await;

        let dup_user = store
            .create_user(CreateUserParams {
                username: "alice".to_string(),
                role: Role::Banker,
                hashed_password: "hash".to_string(),
                full_name: "Other".to_string(),
                email: "other@example.com".to_string(),
            })
            .await;
        assert!(matches!(dup_user, Err(StoreError::UniqueViolation(_))));

        let dup_account = store
            .create_account(CreateAccountParams {
                owner: "alice".to_string(),
                balance: 0,
                currency: Currency::USD,
            })
            .await;
        assert!(matches!(dup_account, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_account_requires_existing_owner() {
        let store = MemoryStore::new();
        let result = store
            .create_account(CreateAccountParams {
                owner: "ghost".to_string(),
                balance: 0,
                currency: Currency::ZAR,
            })
            .await;
        assert!(matches!(result, Err(StoreError::ForeignKeyViolation(_))));
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        let account = seed(&store, "alice").await;

        {
            let mut tx = store.begin().await.unwrap();
            let locked = tx.add_account_balance(account.id, -30).await.unwrap();
            assert_eq!(locked.balance, 70);
            tx.create_entry(CreateEntryParams {
                account_id: account.id,
                amount: -30,
            })
            .await
            .unwrap();
        }

        assert_eq!(store.get_account(account.id).await.unwrap().balance, 100);
        assert!(store.list_entries(account.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_row_lock_blocks_until_commit() {
        let store = MemoryStore::new();
        let account = seed(&store, "alice").await;

        let mut first = store.begin().await.unwrap();
        first.lock_account(account.id).await.unwrap();
        first.add_account_balance(account.id, 5).await.unwrap();

        let contender = {
            let store = store.clone();
            tokio::spawn(async move { store.add_account_balance(account.id, 1).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        first.commit().await.unwrap();
        let after = contender.await.unwrap().unwrap();
        assert_eq!(after.balance, 106);
    }

    #[tokio::test]
    async fn test_delete_checks_owner_and_references() {
        let store = MemoryStore::new();
        let account = seed(&store, "alice").await;

        assert_eq!(
            store.delete_account(account.id, "bob").await,
            Err(StoreError::NotFound)
        );

        let mut tx = store.begin().await.unwrap();
        tx.create_entry(CreateEntryParams {
            account_id: account.id,
            amount: 1,
        })
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert!(matches!(
            store.delete_account(account.id, "alice").await,
            Err(StoreError::ForeignKeyViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_accounts_filters_and_pages() {
        let store = MemoryStore::new();
        seed(&store, "alice").await;
        seed(&store, "bob").await;
        store
            .create_account(CreateAccountParams {
                owner: "alice".to_string(),
                balance: 0,
                currency: Currency::BWP,
            })
            .await
            .unwrap();

        let all = store
            .list_accounts(ListAccountsParams {
                owner: None,
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let alice_page = store
            .list_accounts(ListAccountsParams {
                owner: Some("alice".to_string()),
                limit: 1,
                offset: 1,
            })
            .await
            .unwrap();
        assert_eq!(alice_page.len(), 1);
        assert_eq!(alice_page[0].currency, Currency::BWP);
    }
}
