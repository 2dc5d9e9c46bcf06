//! Self-contained access and refresh tokens
//!
//! A token carries a [`Payload`] (id, username, role, issue and expiry
//! time). Two codecs implement [`TokenMaker`]:
//!
//! - [`LocalTokenMaker`]: XChaCha20-Poly1305 encrypted and authenticated
//!   (`sb.local.` prefix), the default
//! - [`JwtMaker`]: HS256-signed JWT, integrity only
//!
//! Both report expiry separately from every other failure so callers can
//! tell "refresh and retry" apart from "reject".

mod jwt;
mod local;
mod payload;

pub use jwt::JwtMaker;
pub use local::LocalTokenMaker;
pub use payload::Payload;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::config::{TokenConfig, TokenKind};
use crate::core_types::Role;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    /// Bad structure, wrong key, tampered bytes or foreign header
    #[error("token is invalid")]
    Malformed,

    #[error("invalid key size: must be {expected} bytes, got {actual}")]
    InvalidKeySize { expected: &'static str, actual: usize },

    #[error("failed to create token: {0}")]
    Creation(String),
}

impl TokenError {
    pub fn is_expired(&self) -> bool {
        matches!(self, TokenError::Expired)
    }
}

pub trait TokenMaker: Send + Sync {
    /// Mint a token for `username` valid for `duration` from now
    fn create_token(
        &self,
        username: &str,
        role: Role,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError>;

    /// Decode and check the token against an explicit clock
    fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError>;

    fn verify_token(&self, token: &str) -> Result<Payload, TokenError> {
        self.verify_token_at(token, Utc::now())
    }
}

/// Build the configured codec
pub fn build_token_maker(config: &TokenConfig) -> Result<Arc<dyn TokenMaker>, TokenError> {
    let key = config.symmetric_key.as_bytes();
    let leeway = Duration::seconds(config.leeway_secs as i64);
    let maker: Arc<dyn TokenMaker> = match config.kind {
        TokenKind::Local => Arc::new(LocalTokenMaker::new(key)?.with_leeway(leeway)),
        TokenKind::Jwt => Arc::new(JwtMaker::new(key)?.with_leeway(leeway)),
    };
    Ok(maker)
}
