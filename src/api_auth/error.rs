//! Authorization gate error types.
//!
//! Every code except [`AuthErrorCode::RoleNotAllowed`] means the caller
//! could not be authenticated.

/// Authorization error codes (4001-4007).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum AuthErrorCode {
    /// 4001: No authorization value in the call metadata
    MissingCredential = 4001,
    /// 4002: More than one authorization value
    MultipleCredentials = 4002,
    /// 4003: Authorization value is not `<scheme> <token>`
    InvalidFormat = 4003,
    /// 4004: Scheme other than bearer
    UnsupportedScheme = 4004,
    /// 4005: Token verified but its expiry has passed
    TokenExpired = 4005,
    /// 4006: Token failed verification
    InvalidToken = 4006,
    /// 4007: Authenticated, but the role may not call this method
    RoleNotAllowed = 4007,
}

impl AuthErrorCode {
    /// Get error code as i32.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get error name string.
    pub fn name(self) -> &'static str {
        match self {
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::MultipleCredentials => "MULTIPLE_CREDENTIALS",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::UnsupportedScheme => "UNSUPPORTED_SCHEME",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::RoleNotAllowed => "ROLE_NOT_ALLOWED",
        }
    }

    /// True when the caller's identity is established
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::RoleNotAllowed)
    }
}

/// Authorization error with message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub code: AuthErrorCode,
    pub message: String,
}

impl AuthError {
    /// Create a new auth error.
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create error with default message.
    pub fn from_code(code: AuthErrorCode) -> Self {
        let message = match code {
            AuthErrorCode::MissingCredential => "missing authorization header",
            AuthErrorCode::MultipleCredentials => "multiple authorization headers",
            AuthErrorCode::InvalidFormat => "invalid authorization header format",
            AuthErrorCode::UnsupportedScheme => "unsupported authorization type",
            AuthErrorCode::TokenExpired => "access token has expired",
            AuthErrorCode::InvalidToken => "invalid access token",
            AuthErrorCode::RoleNotAllowed => "permission denied",
        };
        Self::new(code, message)
    }
}
