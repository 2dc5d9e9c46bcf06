//! Data models for bank accounts and their ledger entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core_types::{AccountId, Currency, EntryId, MinorUnits};

/// Bank account
///
/// `balance` is only ever changed through an atomic add-balance
/// statement, never assigned outright. It may be negative (overdraft).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    #[schema(example = 1)]
    pub id: AccountId,
    #[schema(example = "alice")]
    pub owner: String,
    /// Balance in minor units
    #[schema(example = 10_000)]
    pub balance: MinorUnits,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
}

/// Single-account ledger line produced by a transfer.
///
/// Negative for a debit, positive for a credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Entry {
    pub id: EntryId,
    pub account_id: AccountId,
    pub amount: MinorUnits,
    pub created_at: DateTime<Utc>,
}

/// Insert parameters for a new account
#[derive(Debug, Clone)]
pub struct CreateAccountParams {
    pub owner: String,
    pub balance: MinorUnits,
    pub currency: Currency,
}

/// Page of accounts; `owner = None` lists every owner's accounts
#[derive(Debug, Clone)]
pub struct ListAccountsParams {
    pub owner: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Insert parameters for a ledger entry
#[derive(Debug, Clone, Copy)]
pub struct CreateEntryParams {
    pub account_id: AccountId,
    pub amount: MinorUnits,
}
