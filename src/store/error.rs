//! Store error kinds
//!
//! Callers branch on the variant, never on the message text.

use thiserror::Error;

/// SQLSTATE codes the store classifies
mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const SERIALIZATION_FAILURE: &str = "40001";
    pub const DEADLOCK_DETECTED: &str = "40P01";
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    /// Transaction aborted by the store (serialization failure, deadlock).
    /// Nothing was committed, the whole operation may be retried.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// True for aborts that left no partial state behind
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            sqlx::Error::Database(ref db) => {
                let constraint = db.constraint().unwrap_or_default().to_string();
                match db.code().as_deref() {
                    Some(sqlstate::UNIQUE_VIOLATION) => StoreError::UniqueViolation(constraint),
                    Some(sqlstate::FOREIGN_KEY_VIOLATION) => {
                        StoreError::ForeignKeyViolation(constraint)
                    }
                    Some(sqlstate::SERIALIZATION_FAILURE) | Some(sqlstate::DEADLOCK_DETECTED) => {
                        StoreError::Conflict(db.message().to_string())
                    }
                    _ => StoreError::Database(e.to_string()),
                }
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}
