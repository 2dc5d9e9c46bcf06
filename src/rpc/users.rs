//! CreateUser, LoginUser, RenewAccessToken

use super::contracts::{
    CreateUserRequest, CreateUserResponse, LoginUserRequest, LoginUserResponse,
    RenewAccessTokenRequest, RenewAccessTokenResponse,
};
use super::error::{Code, RpcError};
use super::service::BankService;
use super::validation::RequestValidation;
use crate::api_auth::RequestContext;
use crate::core_types::Role;
use crate::store::StoreError;
use crate::user_auth::{CreateUserParams, UserProfile, hash_password};

impl BankService {
    /// Public. Self-registered users are always depositors; bankers are
    /// provisioned in the users table directly.
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<CreateUserResponse, RpcError> {
        req.check()?;

        let hashed_password = hash_password(&req.password)
            .map_err(|e| RpcError::internal("failed to hash password", &e))?;

        let user = self
            .store
            .create_user(CreateUserParams {
                username: req.username,
                role: Role::Depositor,
                hashed_password,
                full_name: req.full_name,
                email: req.email,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation(ref constraint) if constraint.contains("email") => {
                    RpcError::new(Code::AlreadyExists, "email already exists")
                }
                other => RpcError::from_store("username", other),
            })?;

        tracing::info!(username = %user.username, role = %user.role, "User created");
        Ok(CreateUserResponse {
            user: UserProfile::from(user),
        })
    }

    /// Public
    pub async fn login_user(
        &self,
        ctx: &RequestContext,
        req: LoginUserRequest,
    ) -> Result<LoginUserResponse, RpcError> {
        req.check()?;

        let outcome = self
            .sessions
            .login(&req.username, &req.password, ctx)
            .await?;

        Ok(LoginUserResponse {
            user: UserProfile::from(outcome.user),
            session_id: outcome.session_id,
            access_token: outcome.access_token,
            refresh_token: outcome.refresh_token,
            access_token_expires_at: outcome.access_token_expires_at,
            refresh_token_expires_at: outcome.refresh_token_expires_at,
        })
    }

    /// Public; the refresh token travels in the body
    pub async fn renew_access_token(
        &self,
        req: RenewAccessTokenRequest,
    ) -> Result<RenewAccessTokenResponse, RpcError> {
        req.check()?;

        let outcome = self.sessions.renew(&req.refresh_token).await?;
        Ok(RenewAccessTokenResponse {
            access_token: outcome.access_token,
            access_token_expires_at: outcome.access_token_expires_at,
        })
    }
}
