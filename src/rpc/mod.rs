//! RPC surface
//!
//! ## Components
//! - `contracts`: request and response types
//! - `validation`: boundary checks reporting every invalid field
//! - `error`: [`RpcError`] status taxonomy
//! - `service`: [`BankService`], methods split by resource in `users`,
//!   `accounts` and `transfers`

pub mod contracts;
pub mod error;
pub mod validation;

mod accounts;
mod service;
mod transfers;
mod users;

pub use contracts::*;
pub use error::{Code, FieldViolation, RpcError};
pub use service::BankService;
pub use validation::RequestValidation;
