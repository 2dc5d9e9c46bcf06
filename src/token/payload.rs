use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TokenError;
use crate::core_types::Role;

/// Claims carried by every token.
///
/// `id` is random per token; a refresh token's id is also the id of the
/// session created for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl Payload {
    pub fn new(username: &str, role: Role, duration: Duration) -> Result<Self, TokenError> {
        let issued_at = Utc::now();
        let expired_at = issued_at
            .checked_add_signed(duration)
            .ok_or_else(|| TokenError::Creation("token duration out of range".to_string()))?;

        Ok(Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            role,
            issued_at,
            expired_at,
        })
    }

    /// Expired once `now` is past `expired_at + leeway`
    pub fn check_expiry(&self, now: DateTime<Utc>, leeway: Duration) -> Result<(), TokenError> {
        let deadline = self
            .expired_at
            .checked_add_signed(leeway)
            .unwrap_or(self.expired_at);
        if now > deadline {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}
