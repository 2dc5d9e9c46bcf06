//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{Account, Entry};
use crate::core_types::{Currency, Role};
use crate::gateway::error::ErrorBody;
use crate::gateway::handlers::HealthResponse;
use crate::rpc::*;
use crate::transfer::{Transfer, TransferTxResult};
use crate::user_auth::UserProfile;

/// Access token sent as `authorization: bearer <token>`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Access token from /v1/login_user or /v1/renew_access",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Simple Bank API",
        version = "1.0.0",
        description = "Users, accounts and atomic transfers between accounts of the same currency.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::create_user,
        crate::gateway::handlers::login_user,
        crate::gateway::handlers::renew_access,
        crate::gateway::handlers::create_account,
        crate::gateway::handlers::get_account,
        crate::gateway::handlers::list_accounts,
        crate::gateway::handlers::update_account,
        crate::gateway::handlers::delete_account,
        crate::gateway::handlers::create_transfer,
        crate::gateway::handlers::get_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorBody,
            FieldViolation,
            Role,
            Currency,
            UserProfile,
            Account,
            Entry,
            Transfer,
            TransferTxResult,
            CreateUserRequest,
            CreateUserResponse,
            LoginUserRequest,
            LoginUserResponse,
            RenewAccessTokenRequest,
            RenewAccessTokenResponse,
            CreateAccountRequest,
            GetAccountRequest,
            ListAccountsRequest,
            ListAccountsResponse,
            UpdateAccountRequest,
            DeleteAccountRequest,
            DeleteAccountResponse,
            AccountResponse,
            CreateTransferRequest,
            GetTransferRequest,
            TransferResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Registration, login and access-token renewal"),
        (name = "Accounts", description = "Account ledger (bearer token required)"),
        (name = "Transfers", description = "Atomic transfers (bearer token required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
