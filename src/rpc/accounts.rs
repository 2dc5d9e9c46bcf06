//! CreateAccount, GetAccount, ListAccounts, UpdateAccount, DeleteAccount

use super::contracts::{
    AccountResponse, CreateAccountRequest, DeleteAccountRequest, DeleteAccountResponse,
    GetAccountRequest, ListAccountsRequest, ListAccountsResponse, UpdateAccountRequest,
};
use super::error::{Code, RpcError};
use super::service::{ANY_ROLE, BANKER_ONLY, BankService};
use super::validation::{RequestValidation, parse_currency};
use crate::api_auth::RequestContext;
use crate::store::StoreError;

impl BankService {
    /// Banker, or a depositor opening an account for themselves
    pub async fn create_account(
        &self,
        ctx: &RequestContext,
        req: CreateAccountRequest,
    ) -> Result<AccountResponse, RpcError> {
        let principal = self.gate.authorize(ctx, ANY_ROLE)?;
        req.check()?;

        if !principal.may_act_for(&req.username) {
            return Err(RpcError::permission_denied(
                "cannot create account for other user",
            ));
        }
        let currency = parse_currency(&req.currency)?;

        let account = self
            .ledger
            .open(&req.username, currency)
            .await
            .map_err(|e| match e {
                StoreError::ForeignKeyViolation(_) => RpcError::not_found("user not found"),
                StoreError::UniqueViolation(_) => RpcError::new(
                    Code::AlreadyExists,
                    format!("{} already holds a {} account", req.username, currency),
                ),
                other => RpcError::from_store("account", other),
            })?;

        Ok(AccountResponse { account })
    }

    /// Banker, or the owning depositor
    pub async fn get_account(
        &self,
        ctx: &RequestContext,
        req: GetAccountRequest,
    ) -> Result<AccountResponse, RpcError> {
        let principal = self.gate.authorize(ctx, ANY_ROLE)?;
        req.check()?;

        let account = self
            .ledger
            .get(req.id)
            .await
            .map_err(|e| RpcError::from_store("account", e))?;

        if !principal.may_act_for(&account.owner) {
            return Err(RpcError::permission_denied(
                "account doesn't belong to the authenticated user",
            ));
        }
        Ok(AccountResponse { account })
    }

    /// Bankers page through every account, depositors through their own
    pub async fn list_accounts(
        &self,
        ctx: &RequestContext,
        req: ListAccountsRequest,
    ) -> Result<ListAccountsResponse, RpcError> {
        let principal = self.gate.authorize(ctx, ANY_ROLE)?;
        req.check()?;

        let owner = if principal.is_banker() {
            None
        } else {
            Some(principal.username.as_str())
        };
        let accounts = self
            .ledger
            .list(owner, req.limit(), req.offset())
            .await
            .map_err(|e| RpcError::from_store("accounts", e))?;

        Ok(ListAccountsResponse { accounts })
    }

    /// Banker only: signed balance adjustment
    pub async fn update_account(
        &self,
        ctx: &RequestContext,
        req: UpdateAccountRequest,
    ) -> Result<AccountResponse, RpcError> {
        let principal = self.gate.authorize(ctx, BANKER_ONLY)?;
        req.check()?;

        let account = self
            .ledger
            .add_balance(req.id, req.amount)
            .await
            .map_err(|e| RpcError::from_store("account", e))?;

        tracing::info!(banker = %principal.username, account_id = req.id, "Account balance updated");
        Ok(AccountResponse { account })
    }

    /// Banker only; the request must name the account's actual owner
    pub async fn delete_account(
        &self,
        ctx: &RequestContext,
        req: DeleteAccountRequest,
    ) -> Result<DeleteAccountResponse, RpcError> {
        let principal = self.gate.authorize(ctx, BANKER_ONLY)?;
        req.check()?;

        let account = self
            .ledger
            .get(req.id)
            .await
            .map_err(|e| RpcError::from_store("account", e))?;
        if account.owner != req.owner {
            return Err(RpcError::new(
                Code::InvalidArgument,
                "account id and owner mismatch",
            ));
        }

        self.ledger
            .delete(req.id, &req.owner)
            .await
            .map_err(|e| match e {
                StoreError::ForeignKeyViolation(_) => RpcError::new(
                    Code::Internal,
                    "account has ledger history and cannot be deleted",
                ),
                other => RpcError::from_store("account", other),
            })?;

        tracing::info!(banker = %principal.username, account_id = req.id, "Account deleted");
        Ok(DeleteAccountResponse {
            message: format!(
                "account [id:{} | owner: {}] has been successfully deleted",
                req.id, req.owner
            ),
        })
    }
}
