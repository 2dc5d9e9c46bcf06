//! Bearer-token authorization gate.
//!
//! Verification flow for one call:
//! 1. exactly one authorization value must be present
//! 2. it must be `<scheme> <token>` with scheme `bearer` (any case)
//! 3. the token must verify against the configured codec
//! 4. the token's role must be in the method's allowed set
//!
//! Row-level ownership is decided by each RPC, not here.

use std::sync::Arc;

use super::context::{Principal, RequestContext};
use super::error::{AuthError, AuthErrorCode};
use crate::core_types::Role;
use crate::token::{TokenError, TokenMaker};

const BEARER_SCHEME: &str = "bearer";

#[derive(Clone)]
pub struct AuthorizationGate {
    token_maker: Arc<dyn TokenMaker>,
}

impl AuthorizationGate {
    pub fn new(token_maker: Arc<dyn TokenMaker>) -> Self {
        Self { token_maker }
    }

    pub fn authorize(
        &self,
        ctx: &RequestContext,
        allowed_roles: &[Role],
    ) -> Result<Principal, AuthError> {
        let value = extract_credential(ctx)?;
        let token = parse_bearer(value)?;

        let payload = self.token_maker.verify_token(token).map_err(|e| match e {
            TokenError::Expired => AuthError::from_code(AuthErrorCode::TokenExpired),
            other => AuthError::new(
                AuthErrorCode::InvalidToken,
                format!("invalid access token: {}", other),
            ),
        })?;

        if !allowed_roles.contains(&payload.role) {
            tracing::debug!(
                username = %payload.username,
                role = %payload.role,
                "role not allowed for this call"
            );
            return Err(AuthError::from_code(AuthErrorCode::RoleNotAllowed));
        }

        Ok(Principal {
            username: payload.username,
            role: payload.role,
        })
    }
}

/// The single authorization value of the call.
pub fn extract_credential(ctx: &RequestContext) -> Result<&str, AuthError> {
    match ctx.authorization.as_slice() {
        [] => Err(AuthError::from_code(AuthErrorCode::MissingCredential)),
        [value] => Ok(value.as_str()),
        _ => Err(AuthError::from_code(AuthErrorCode::MultipleCredentials)),
    }
}

/// Parse `bearer <token>` and return the token.
pub fn parse_bearer(value: &str) -> Result<&str, AuthError> {
    let mut fields = value.split_whitespace();
    let (scheme, token) = match (fields.next(), fields.next(), fields.next()) {
        (Some(scheme), Some(token), None) => (scheme, token),
        _ => return Err(AuthError::from_code(AuthErrorCode::InvalidFormat)),
    };

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::new(
            AuthErrorCode::UnsupportedScheme,
            format!("unsupported authorization type {}", scheme.to_lowercase()),
        ));
    }

    Ok(token)
}
