//! RPC status taxonomy.
//!
//! [`RpcError`] is the only error that leaves the service layer. Domain
//! errors are translated by kind; store driver text never reaches a caller.

use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api_auth::AuthError;
use crate::store::StoreError;
use crate::transfer::TransferError;
use crate::user_auth::SessionError;

/// Status categories, numbered as gRPC status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Code {
    InvalidArgument = 3,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    Internal = 13,
    Unauthenticated = 16,
}

impl Code {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::Internal => "INTERNAL",
            Self::Unauthenticated => "UNAUTHENTICATED",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::AlreadyExists => StatusCode::CONFLICT,
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
        }
    }
}

/// One invalid request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldViolation {
    #[schema(example = "amount")]
    pub field: String,
    #[schema(example = "must be a positive integer")]
    pub description: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {message}", code.name())]
pub struct RpcError {
    pub code: Code,
    pub message: String,
    /// Every invalid field; only set for `InvalidArgument`
    pub violations: Vec<FieldViolation>,
}

impl RpcError {
    pub fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            violations: Vec::new(),
        }
    }

    pub fn invalid_argument(mut violations: Vec<FieldViolation>) -> Self {
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        Self {
            code: Code::InvalidArgument,
            message: "invalid parameters".to_string(),
            violations,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Code::NotFound, message)
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(Code::PermissionDenied, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(Code::Unauthenticated, message)
    }

    /// Log the cause, return a generic message
    pub fn internal(context: &str, cause: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "{}", context);
        Self::new(Code::Internal, context)
    }

    /// Store failure while looking up `what`
    pub fn from_store(what: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::not_found(format!("{} not found", what)),
            StoreError::UniqueViolation(_) => {
                Self::new(Code::AlreadyExists, format!("{} already exists", what))
            }
            other => Self::internal(&format!("failed to access {}", what), &other),
        }
    }
}

impl From<AuthError> for RpcError {
    fn from(err: AuthError) -> Self {
        if err.code.is_authenticated() {
            Self::permission_denied(err.message)
        } else {
            Self::unauthenticated(format!("unauthorized: {}", err.message))
        }
    }
}

impl From<TransferError> for RpcError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::InvalidAmount => Self::invalid_argument(vec![FieldViolation::new(
                "amount",
                "must be a positive integer",
            )]),
            TransferError::SameAccount => Self::invalid_argument(vec![FieldViolation::new(
                "to_account_id",
                "must differ from from_account_id",
            )]),
            TransferError::AccountNotFound(_) => Self::not_found(err.to_string()),
            TransferError::CurrencyMismatch { .. } => Self::new(Code::Internal, err.to_string()),
            TransferError::Store(ref e) if e.is_retryable() => {
                tracing::warn!(error = %e, "Transfer conflict");
                Self::new(Code::Internal, "transfer aborted by a concurrent update, retry")
            }
            TransferError::Store(e) => Self::internal("failed to transfer", &e),
        }
    }
}

impl From<SessionError> for RpcError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::UserNotFound => Self::not_found("user not found"),
            SessionError::IncorrectCredentials => Self::not_found("incorrect credentials"),
            SessionError::InvalidRefreshToken(e) => {
                Self::unauthenticated(format!("invalid refresh token: {}", e))
            }
            SessionError::SessionNotFound => Self::not_found("session not found"),
            SessionError::SessionBlocked => Self::permission_denied("blocked session"),
            SessionError::SessionUserMismatch => Self::permission_denied("incorrect session user"),
            SessionError::RefreshTokenMismatch => {
                Self::unauthenticated("mismatched session token")
            }
            SessionError::SessionExpired => Self::unauthenticated("expired session"),
            SessionError::Token(e) => Self::internal("failed to create token", &e),
            SessionError::Password(e) => Self::internal("failed to check password", &e),
            SessionError::Store(e) => Self::internal("failed to access session", &e),
        }
    }
}
