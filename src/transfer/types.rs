//! Transfer types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::account::{Account, Entry};
use crate::core_types::{AccountId, Currency, MinorUnits, TransferId};

/// Committed movement of funds between two accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transfer {
    pub id: TransferId,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    /// Always positive
    #[schema(example = 10)]
    pub amount: MinorUnits,
    pub created_at: DateTime<Utc>,
}

/// Insert parameters for a transfer row
#[derive(Debug, Clone, Copy)]
pub struct CreateTransferParams {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: MinorUnits,
}

/// Requested transfer, before account validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: MinorUnits,
    pub currency: Currency,
}

/// Input of the atomic section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferTxParams {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: MinorUnits,
}

impl From<TransferRequest> for TransferTxParams {
    fn from(req: TransferRequest) -> Self {
        Self {
            from_account_id: req.from_account_id,
            to_account_id: req.to_account_id,
            amount: req.amount,
        }
    }
}

/// Everything written by one committed transfer, as of its commit point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

impl TransferTxResult {
    /// Debit and credit entries cancel out exactly
    pub fn is_zero_sum(&self) -> bool {
        self.from_entry.amount.checked_add(self.to_entry.amount) == Some(0)
            && self.from_entry.amount == -self.transfer.amount
    }
}

/// Canonical lock order for a pair of accounts: ascending id.
///
/// Every multi-account transaction must acquire row locks in this order,
/// whichever side is the sender.
pub fn lock_order(a: AccountId, b: AccountId) -> (AccountId, AccountId) {
    if a <= b { (a, b) } else { (b, a) }
}
