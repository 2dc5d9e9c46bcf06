//! Transfer error types

use thiserror::Error;

use crate::core_types::{AccountId, Currency};
use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Request errors ===
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("source and target account cannot be the same")]
    SameAccount,

    // === Account errors ===
    #[error("account [{0}] not found")]
    AccountNotFound(AccountId),

    #[error("account [{account_id}] currency mismatch: {actual} vs {expected}")]
    CurrencyMismatch {
        account_id: AccountId,
        expected: Currency,
        actual: Currency,
    },

    // === System errors ===
    /// Store failure; nothing was committed
    #[error("transfer transaction failed: {0}")]
    Store(#[from] StoreError),
}

impl TransferError {
    /// Get the error code for logs and API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::SameAccount => "SAME_ACCOUNT",
            TransferError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            TransferError::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            TransferError::Store(StoreError::Conflict(_)) => "TRANSACTION_CONFLICT",
            TransferError::Store(_) => "DATABASE_ERROR",
        }
    }

    /// Safe to re-run the whole transfer from scratch
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransferError::Store(e) if e.is_retryable())
    }
}
