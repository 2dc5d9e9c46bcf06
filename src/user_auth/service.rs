//! Login and access-token renewal

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{CreateSessionParams, User};
use super::password::{PasswordError, check_password};
use super::session_store::SessionStore;
use crate::api_auth::RequestContext;
use crate::store::{Store, StoreError};
use crate::token::{TokenError, TokenMaker};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("user not found")]
    UserNotFound,

    #[error("incorrect credentials")]
    IncorrectCredentials,

    #[error("invalid refresh token: {0}")]
    InvalidRefreshToken(TokenError),

    #[error("session not found")]
    SessionNotFound,

    #[error("session is blocked")]
    SessionBlocked,

    #[error("incorrect session user")]
    SessionUserMismatch,

    #[error("mismatched session token")]
    RefreshTokenMismatch,

    #[error("session has expired")]
    SessionExpired,

    #[error("token error: {0}")]
    Token(TokenError),

    #[error("password hash error: {0}")]
    Password(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session_id: Uuid,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Outcome of a successful renewal; the session itself is untouched
#[derive(Debug, Clone)]
pub struct RenewOutcome {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

pub struct SessionLifecycle {
    store: Arc<dyn Store>,
    sessions: SessionStore,
    token_maker: Arc<dyn TokenMaker>,
    access_token_duration: Duration,
    refresh_token_duration: Duration,
}

impl SessionLifecycle {
    pub fn new(
        store: Arc<dyn Store>,
        token_maker: Arc<dyn TokenMaker>,
        access_token_duration: Duration,
        refresh_token_duration: Duration,
    ) -> Self {
        Self {
            sessions: SessionStore::new(store.clone()),
            store,
            token_maker,
            access_token_duration,
            refresh_token_duration,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Check credentials, mint an access/refresh pair and persist the
    /// refresh session.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        ctx: &RequestContext,
    ) -> Result<LoginOutcome, SessionError> {
        let user = self.store.get_user(username).await.map_err(|e| match e {
            StoreError::NotFound => SessionError::UserNotFound,
            other => SessionError::Store(other),
        })?;

        check_password(password, &user.hashed_password).map_err(|e| match e {
            PasswordError::Mismatch => SessionError::IncorrectCredentials,
            other => SessionError::Password(other.to_string()),
        })?;

        let (access_token, access_payload) = self
            .token_maker
            .create_token(&user.username, user.role, self.access_token_duration)
            .map_err(SessionError::Token)?;
        let (refresh_token, refresh_payload) = self
            .token_maker
            .create_token(&user.username, user.role, self.refresh_token_duration)
            .map_err(SessionError::Token)?;

        let session = self
            .sessions
            .create(CreateSessionParams {
                id: refresh_payload.id,
                username: user.username.clone(),
                refresh_token: refresh_token.clone(),
                user_agent: ctx.user_agent.clone(),
                client_ip: ctx.client_ip.clone(),
                is_blocked: false,
                expires_at: refresh_payload.expired_at,
            })
            .await?;

        tracing::info!(
            username = %user.username,
            session_id = %session.id,
            client_ip = %session.client_ip,
            "User logged in"
        );

        Ok(LoginOutcome {
            user,
            session_id: session.id,
            access_token,
            access_token_expires_at: access_payload.expired_at,
            refresh_token,
            refresh_token_expires_at: refresh_payload.expired_at,
        })
    }

    /// Mint a new access token for a live, unblocked session.
    ///
    /// Checks run in a fixed order: token, session lookup, blocked flag,
    /// session user, stored token, session expiry.
    pub async fn renew(&self, refresh_token: &str) -> Result<RenewOutcome, SessionError> {
        let payload = self
            .token_maker
            .verify_token(refresh_token)
            .map_err(SessionError::InvalidRefreshToken)?;

        let session = self.sessions.get(payload.id).await.map_err(|e| match e {
            StoreError::NotFound => SessionError::SessionNotFound,
            other => SessionError::Store(other),
        })?;

        if session.is_blocked {
            return Err(SessionError::SessionBlocked);
        }
        if session.username != payload.username {
            return Err(SessionError::SessionUserMismatch);
        }
        if session.refresh_token != refresh_token {
            return Err(SessionError::RefreshTokenMismatch);
        }
        if Utc::now() > session.expires_at {
            return Err(SessionError::SessionExpired);
        }

        let (access_token, access_payload) = self
            .token_maker
            .create_token(&payload.username, payload.role, self.access_token_duration)
            .map_err(SessionError::Token)?;

        tracing::debug!(username = %payload.username, session_id = %session.id, "Access token renewed");

        Ok(RenewOutcome {
            access_token,
            access_token_expires_at: access_payload.expired_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Role;
    use crate::store::MemoryStore;
    use crate::token::LocalTokenMaker;
    use crate::user_auth::models::CreateUserParams;
    use crate::user_auth::password::hash_password;

    const KEY: &[u8] = b"12345678901234567890123456789012";

    async fn setup() -> (SessionLifecycle, Arc<dyn Store>, Arc<dyn TokenMaker>) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let maker: Arc<dyn TokenMaker> = Arc::new(LocalTokenMaker::new(KEY).unwrap());
        store
            .create_user(CreateUserParams {
                username: "alice".to_string(),
                role: Role::Depositor,
                hashed_password: hash_password("secret123").unwrap(),
                full_name: "Alice Smith".to_string(),
                email: "alice@example.com".to_string(),
            })
            .await
            .unwrap();

        let lifecycle = SessionLifecycle::new(
            store.clone(),
            maker.clone(),
            Duration::minutes(15),
            Duration::hours(24),
        );
        (lifecycle, store, maker)
    }

    fn ctx() -> RequestContext {
        RequestContext::new("test-agent/1.0", "10.0.0.1")
    }

    #[tokio::test]
    async fn test_login_persists_session_with_metadata() {
        let (lifecycle, store, maker) = setup().await;
        let outcome = lifecycle.login("alice", "secret123", &ctx()).await.unwrap();

        let session = store.get_session(outcome.session_id).await.unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.refresh_token, outcome.refresh_token);
        assert_eq!(session.user_agent, "test-agent/1.0");
        assert_eq!(session.client_ip, "10.0.0.1");
        assert!(!session.is_blocked);
        assert_eq!(session.expires_at, outcome.refresh_token_expires_at);

        let access = maker.verify_token(&outcome.access_token).unwrap();
        let refresh = maker.verify_token(&outcome.refresh_token).unwrap();
        assert_ne!(access.id, refresh.id);
        assert_eq!(refresh.id, outcome.session_id);
        assert!(outcome.access_token_expires_at < outcome.refresh_token_expires_at);
    }

    #[tokio::test]
    async fn test_login_failures_are_distinguished() {
        let (lifecycle, _, _) = setup().await;
        assert_eq!(
            lifecycle.login("nobody", "secret123", &ctx()).await.unwrap_err(),
            SessionError::UserNotFound
        );
        assert_eq!(
            lifecycle.login("alice", "wrong-pass", &ctx()).await.unwrap_err(),
            SessionError::IncorrectCredentials
        );
    }

    #[tokio::test]
    async fn test_renew_issues_later_access_token() {
        let (lifecycle, _, _) = setup().await;
        let login = lifecycle.login("alice", "secret123", &ctx()).await.unwrap();

        let renewed = lifecycle.renew(&login.refresh_token).await.unwrap();
        assert!(renewed.access_token_expires_at >= login.access_token_expires_at);
        assert_ne!(renewed.access_token, login.access_token);
    }

    #[tokio::test]
    async fn test_renew_rejects_blocked_session() {
        let (lifecycle, _, _) = setup().await;
        let login = lifecycle.login("alice", "secret123", &ctx()).await.unwrap();

        lifecycle.sessions().block(login.session_id).await.unwrap();
        assert_eq!(
            lifecycle.renew(&login.refresh_token).await.unwrap_err(),
            SessionError::SessionBlocked
        );
    }

    #[tokio::test]
    async fn test_renew_rejects_unknown_session() {
        let (lifecycle, _, maker) = setup().await;
        // Valid token, but no login ever stored a session for it
        let (orphan, _) = maker
            .create_token("alice", Role::Depositor, Duration::hours(1))
            .unwrap();
        assert_eq!(
            lifecycle.renew(&orphan).await.unwrap_err(),
            SessionError::SessionNotFound
        );
    }

    #[tokio::test]
    async fn test_renew_rejects_tampered_token() {
        let (lifecycle, _, _) = setup().await;
        let login = lifecycle.login("alice", "secret123", &ctx()).await.unwrap();

        let tampered = format!("{}x", login.refresh_token);
        assert!(matches!(
            lifecycle.renew(&tampered).await.unwrap_err(),
            SessionError::InvalidRefreshToken(TokenError::Malformed)
        ));
    }

    #[tokio::test]
    async fn test_renew_checks_session_fields() {
        let (lifecycle, store, maker) = setup().await;
        store
            .create_user(CreateUserParams {
                username: "bob".to_string(),
                role: Role::Depositor,
                hashed_password: hash_password("secret123").unwrap(),
                full_name: "Bob Jones".to_string(),
                email: "bob@example.com".to_string(),
            })
            .await
            .unwrap();

        let (token, payload) = maker
            .create_token("alice", Role::Depositor, Duration::hours(1))
            .unwrap();
        let base = CreateSessionParams {
            id: payload.id,
            username: "alice".to_string(),
            refresh_token: token.clone(),
            user_agent: String::new(),
            client_ip: String::new(),
            is_blocked: false,
            expires_at: payload.expired_at,
        };

        // Session stored under another user
        store
            .create_session(CreateSessionParams {
                username: "bob".to_string(),
                ..base.clone()
            })
            .await
            .unwrap();
        assert_eq!(
            lifecycle.renew(&token).await.unwrap_err(),
            SessionError::SessionUserMismatch
        );

        // Session holding a different refresh token
        let (token2, payload2) = maker
            .create_token("alice", Role::Depositor, Duration::hours(1))
            .unwrap();
        store
            .create_session(CreateSessionParams {
                id: payload2.id,
                refresh_token: "superseded".to_string(),
                ..base.clone()
            })
            .await
            .unwrap();
        assert_eq!(
            lifecycle.renew(&token2).await.unwrap_err(),
            SessionError::RefreshTokenMismatch
        );

        // Session expired on its own clock while the token is still valid
        let (token3, payload3) = maker
            .create_token("alice", Role::Depositor, Duration::hours(1))
            .unwrap();
        store
            .create_session(CreateSessionParams {
                id: payload3.id,
                refresh_token: token3.clone(),
                expires_at: Utc::now() - Duration::minutes(1),
                ..base
            })
            .await
            .unwrap();
        assert_eq!(
            lifecycle.renew(&token3).await.unwrap_err(),
            SessionError::SessionExpired
        );
    }
}
