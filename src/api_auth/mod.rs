//! Per-call authorization.
//!
//! ## Components
//! - `context`: typed call metadata ([`RequestContext`]) and [`Principal`]
//! - `gate`: bearer-token [`AuthorizationGate`]
//! - `error`: gate error codes (4001-4007)

pub mod context;
pub mod error;
pub mod gate;

pub use context::{Principal, RequestContext};
pub use error::{AuthError, AuthErrorCode};
pub use gate::{AuthorizationGate, extract_credential, parse_bearer};
