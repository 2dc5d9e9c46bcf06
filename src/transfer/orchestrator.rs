//! Transfer orchestrator
//!
//! `transfer` = validate both accounts, then `transfer_tx`. Callers that
//! need a check between the two account lookups (ownership of the source
//! account) drive [`TransferOrchestrator::validate_account`] and
//! [`TransferOrchestrator::transfer_tx`] themselves.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::TransferError;
use super::types::{
    CreateTransferParams, TransferRequest, TransferTxParams, TransferTxResult, lock_order,
};
use crate::account::{Account, CreateEntryParams};
use crate::core_types::{AccountId, Currency};
use crate::store::{Store, StoreError, TransferTx};

#[derive(Clone)]
pub struct TransferOrchestrator {
    store: Arc<dyn Store>,
}

impl TransferOrchestrator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validate both accounts and move the funds
    pub async fn transfer(&self, req: TransferRequest) -> Result<TransferTxResult, TransferError> {
        check_params(req.from_account_id, req.to_account_id, req.amount)?;
        self.validate_account(req.from_account_id, req.currency).await?;
        self.validate_account(req.to_account_id, req.currency).await?;
        self.transfer_tx(req.into()).await
    }

    /// The account exists and holds exactly `currency`
    pub async fn validate_account(
        &self,
        id: AccountId,
        currency: Currency,
    ) -> Result<Account, TransferError> {
        let account = self.store.get_account(id).await.map_err(|e| match e {
            StoreError::NotFound => TransferError::AccountNotFound(id),
            other => TransferError::Store(other),
        })?;

        if account.currency != currency {
            return Err(TransferError::CurrencyMismatch {
                account_id: id,
                expected: currency,
                actual: account.currency,
            });
        }
        Ok(account)
    }

    /// Atomic section: lock both rows in ascending id order, write the
    /// transfer and both entries, apply both balance changes, commit.
    ///
    /// Any error rolls the whole transaction back. Dropping the returned
    /// future mid-flight drops the transaction, which also rolls back.
    pub async fn transfer_tx(
        &self,
        params: TransferTxParams,
    ) -> Result<TransferTxResult, TransferError> {
        check_params(params.from_account_id, params.to_account_id, params.amount)?;

        let mut tx = self.store.begin().await?;
        match execute(tx.as_mut(), params).await {
            Ok(result) => {
                tx.commit().await?;
                info!(
                    transfer_id = result.transfer.id,
                    from = params.from_account_id,
                    to = params.to_account_id,
                    amount = params.amount,
                    "Transfer committed"
                );
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Transfer rollback failed");
                }
                warn!(
                    from = params.from_account_id,
                    to = params.to_account_id,
                    error = %e,
                    "Transfer aborted"
                );
                Err(match e {
                    StoreError::NotFound => TransferError::AccountNotFound(
                        missing_account(&*self.store, params).await,
                    ),
                    other => TransferError::Store(other),
                })
            }
        }
    }
}

fn check_params(from: AccountId, to: AccountId, amount: i64) -> Result<(), TransferError> {
    if amount <= 0 {
        return Err(TransferError::InvalidAmount);
    }
    if from == to {
        return Err(TransferError::SameAccount);
    }
    Ok(())
}

async fn execute(
    tx: &mut dyn TransferTx,
    params: TransferTxParams,
) -> Result<TransferTxResult, StoreError> {
    let TransferTxParams {
        from_account_id: from,
        to_account_id: to,
        amount,
    } = params;
    let (first, second) = lock_order(from, to);

    tx.lock_account(first).await?;
    tx.lock_account(second).await?;
    debug!(first, second, "Account rows locked");

    let transfer = tx
        .create_transfer(CreateTransferParams {
            from_account_id: from,
            to_account_id: to,
            amount,
        })
        .await?;
    let from_entry = tx
        .create_entry(CreateEntryParams {
            account_id: from,
            amount: -amount,
        })
        .await?;
    let to_entry = tx
        .create_entry(CreateEntryParams {
            account_id: to,
            amount,
        })
        .await?;

    let (from_account, to_account) = if from == first {
        let from_account = tx.add_account_balance(from, -amount).await?;
        let to_account = tx.add_account_balance(to, amount).await?;
        (from_account, to_account)
    } else {
        let to_account = tx.add_account_balance(to, amount).await?;
        let from_account = tx.add_account_balance(from, -amount).await?;
        (from_account, to_account)
    };

    Ok(TransferTxResult {
        transfer,
        from_account,
        to_account,
        from_entry,
        to_entry,
    })
}

/// Which side vanished between validation and the lock
async fn missing_account(store: &dyn Store, params: TransferTxParams) -> AccountId {
    match store.get_account(params.from_account_id).await {
        Err(StoreError::NotFound) => params.from_account_id,
        _ => params.to_account_id,
    }
}
