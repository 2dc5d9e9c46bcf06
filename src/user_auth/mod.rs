//! Users, credentials and refresh sessions.
//!
//! ## Components
//! - `models`: user and session records
//! - `password`: argon2 hashing
//! - `session_store`: refresh-session persistence
//! - `service`: [`SessionLifecycle`] (login, access-token renewal)

pub mod models;
pub mod password;
pub mod service;
pub mod session_store;

pub use models::{CreateSessionParams, CreateUserParams, Session, User, UserProfile};
pub use password::{PasswordError, check_password, hash_password};
pub use service::{LoginOutcome, RenewOutcome, SessionError, SessionLifecycle};
pub use session_store::SessionStore;
