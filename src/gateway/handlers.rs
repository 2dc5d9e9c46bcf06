//! Route handlers
//!
//! Every RPC is `POST /v1/<method>` with a JSON body. Handlers only move
//! data between HTTP and [`crate::rpc::BankService`].

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::{ApiResult, ErrorBody};
use super::extract::{CallContext, RpcJson};
use super::state::AppState;
use crate::rpc::*;
use crate::transfer::TransferTxResult;

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Backing store in use
    #[schema(example = "postgres")]
    pub store: String,
    #[schema(example = "a1b2c3d")]
    pub git_hash: String,
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
}

/// Health check, pings the store
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.service.store();
    let (code, status) = match store.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!(error = %e, store = store.name(), "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };
    let body = HealthResponse {
        status: status.to_string(),
        store: store.name().to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        timestamp_ms: chrono::Utc::now().timestamp_millis(),
    };
    (code, Json(body))
}

// ============================================================================
// Users
// ============================================================================

#[utoipa::path(
    post,
    path = "/v1/create_user",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 409, description = "Username or email taken", body = ErrorBody)
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    RpcJson(req): RpcJson<CreateUserRequest>,
) -> ApiResult<CreateUserResponse> {
    Ok(Json(state.service.create_user(req).await?))
}

#[utoipa::path(
    post,
    path = "/v1/login_user",
    request_body = LoginUserRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = LoginUserResponse),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 404, description = "Unknown user or incorrect credentials", body = ErrorBody)
    ),
    tag = "Users"
)]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    CallContext(ctx): CallContext,
    RpcJson(req): RpcJson<LoginUserRequest>,
) -> ApiResult<LoginUserResponse> {
    Ok(Json(state.service.login_user(&ctx, req).await?))
}

#[utoipa::path(
    post,
    path = "/v1/renew_access",
    request_body = RenewAccessTokenRequest,
    responses(
        (status = 200, description = "New access token", body = RenewAccessTokenResponse),
        (status = 401, description = "Invalid, mismatched or expired refresh token", body = ErrorBody),
        (status = 403, description = "Blocked session", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    ),
    tag = "Users"
)]
pub async fn renew_access(
    State(state): State<Arc<AppState>>,
    RpcJson(req): RpcJson<RenewAccessTokenRequest>,
) -> ApiResult<RenewAccessTokenResponse> {
    Ok(Json(state.service.renew_access_token(req).await?))
}

// ============================================================================
// Accounts
// ============================================================================

#[utoipa::path(
    post,
    path = "/v1/create_account",
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Account opened with zero balance", body = AccountResponse),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 409, description = "Owner already holds this currency", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    CallContext(ctx): CallContext,
    RpcJson(req): RpcJson<CreateAccountRequest>,
) -> ApiResult<AccountResponse> {
    Ok(Json(state.service.create_account(&ctx, req).await?))
}

#[utoipa::path(
    post,
    path = "/v1/get_account",
    request_body = GetAccountRequest,
    responses(
        (status = 200, description = "Account", body = AccountResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    CallContext(ctx): CallContext,
    RpcJson(req): RpcJson<GetAccountRequest>,
) -> ApiResult<AccountResponse> {
    Ok(Json(state.service.get_account(&ctx, req).await?))
}

#[utoipa::path(
    post,
    path = "/v1/list_accounts",
    request_body = ListAccountsRequest,
    responses(
        (status = 200, description = "One page of accounts", body = ListAccountsResponse),
        (status = 400, description = "Invalid paging", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    CallContext(ctx): CallContext,
    RpcJson(req): RpcJson<ListAccountsRequest>,
) -> ApiResult<ListAccountsResponse> {
    Ok(Json(state.service.list_accounts(&ctx, req).await?))
}

#[utoipa::path(
    post,
    path = "/v1/update_account",
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Adjusted account", body = AccountResponse),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 403, description = "Banker role required", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    CallContext(ctx): CallContext,
    RpcJson(req): RpcJson<UpdateAccountRequest>,
) -> ApiResult<AccountResponse> {
    Ok(Json(state.service.update_account(&ctx, req).await?))
}

#[utoipa::path(
    post,
    path = "/v1/delete_account",
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account deleted", body = DeleteAccountResponse),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 403, description = "Not the owner", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    CallContext(ctx): CallContext,
    RpcJson(req): RpcJson<DeleteAccountRequest>,
) -> ApiResult<DeleteAccountResponse> {
    Ok(Json(state.service.delete_account(&ctx, req).await?))
}

// ============================================================================
// Transfers
// ============================================================================

#[utoipa::path(
    post,
    path = "/v1/create_transfer",
    request_body = CreateTransferRequest,
    responses(
        (status = 200, description = "Committed transfer with both entries and balances", body = TransferTxResult),
        (status = 400, description = "Invalid fields", body = ErrorBody),
        (status = 401, description = "Missing or invalid access token", body = ErrorBody),
        (status = 403, description = "Source account owned by someone else", body = ErrorBody),
        (status = 404, description = "Account not found", body = ErrorBody),
        (status = 500, description = "Currency mismatch or store failure", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    CallContext(ctx): CallContext,
    RpcJson(req): RpcJson<CreateTransferRequest>,
) -> ApiResult<TransferTxResult> {
    Ok(Json(state.service.create_transfer(&ctx, req).await?))
}

#[utoipa::path(
    post,
    path = "/v1/get_transfer",
    request_body = GetTransferRequest,
    responses(
        (status = 200, description = "Transfer", body = TransferResponse),
        (status = 403, description = "Caller owns neither side", body = ErrorBody),
        (status = 404, description = "Transfer not found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    CallContext(ctx): CallContext,
    RpcJson(req): RpcJson<GetTransferRequest>,
) -> ApiResult<TransferResponse> {
    Ok(Json(state.service.get_transfer(&ctx, req).await?))
}
