//! CreateTransfer, GetTransfer

use super::contracts::{CreateTransferRequest, GetTransferRequest, TransferResponse};
use super::error::RpcError;
use super::service::{ANY_ROLE, BankService};
use super::validation::{RequestValidation, parse_currency};
use crate::api_auth::RequestContext;
use crate::transfer::{TransferTxParams, TransferTxResult};

impl BankService {
    /// Banker, or a depositor sending from their own account.
    ///
    /// Order: authorize, validate, source account, ownership, target
    /// account, atomic transfer.
    pub async fn create_transfer(
        &self,
        ctx: &RequestContext,
        req: CreateTransferRequest,
    ) -> Result<TransferTxResult, RpcError> {
        let principal = self.gate.authorize(ctx, ANY_ROLE)?;
        req.check()?;
        let currency = parse_currency(&req.currency)?;

        let from = self
            .transfers
            .validate_account(req.from_account_id, currency)
            .await?;
        if !principal.may_act_for(&from.owner) {
            return Err(RpcError::permission_denied(
                "from account doesn't belong to the authenticated user",
            ));
        }
        self.transfers
            .validate_account(req.to_account_id, currency)
            .await?;

        let result = self
            .transfers
            .transfer_tx(TransferTxParams {
                from_account_id: req.from_account_id,
                to_account_id: req.to_account_id,
                amount: req.amount,
            })
            .await?;
        Ok(result)
    }

    /// Banker, or a depositor owning the sending or the receiving account
    pub async fn get_transfer(
        &self,
        ctx: &RequestContext,
        req: GetTransferRequest,
    ) -> Result<TransferResponse, RpcError> {
        let principal = self.gate.authorize(ctx, ANY_ROLE)?;
        req.check()?;

        let transfer = self
            .store
            .get_transfer(req.id)
            .await
            .map_err(|e| RpcError::from_store("transfer", e))?;

        if !principal.is_banker() {
            let from = self
                .ledger
                .get(transfer.from_account_id)
                .await
                .map_err(|e| RpcError::from_store("account", e))?;
            let to = self
                .ledger
                .get(transfer.to_account_id)
                .await
                .map_err(|e| RpcError::from_store("account", e))?;

            if !principal.may_act_for(&from.owner) && !principal.may_act_for(&to.owner) {
                return Err(RpcError::permission_denied(
                    "transfer doesn't involve the authenticated user",
                ));
            }
        }

        Ok(TransferResponse { transfer })
    }
}
