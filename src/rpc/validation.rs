//! Boundary validation
//!
//! Requests are checked before any store access. Every invalid field is
//! reported, not just the first one.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use super::error::{FieldViolation, RpcError};
use crate::core_types::Currency;

pub const MIN_PAGE_SIZE: i32 = 5;
pub const MAX_PAGE_SIZE: i32 = 10;
/// Upper bound for a transfer amount and for an administrative adjustment
pub const MAX_AMOUNT: i64 = 1_000_000_000;

pub trait RequestValidation: Validate {
    /// Checks the derive attributes cannot express
    fn extra_violations(&self) -> Vec<FieldViolation> {
        Vec::new()
    }

    fn check(&self) -> Result<(), RpcError> {
        let mut violations = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => violations_of(&errors),
        };
        violations.extend(self.extra_violations());

        if violations.is_empty() {
            Ok(())
        } else {
            Err(RpcError::invalid_argument(violations))
        }
    }
}

pub fn violations_of(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs.iter() {
            let description = err
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            violations.push(FieldViolation::new(field.to_string(), description));
        }
    }
    violations
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

// ============================================================================
// Field validators
// ============================================================================

pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        Ok(())
    } else {
        Err(invalid(
            "username",
            "must contain only lowercase letters, digits, or underscore",
        ))
    }
}

pub fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        Ok(())
    } else {
        Err(invalid("full_name", "must contain only letters or spaces"))
    }
}

pub fn validate_currency(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<Currency>()
        .map(|_| ())
        .map_err(|_| invalid("currency", "unsupported currency"))
}

pub fn page_size_violation(page_size: i32) -> Option<FieldViolation> {
    if page_size < MIN_PAGE_SIZE {
        Some(FieldViolation::new(
            "page_size",
            format!("minimum page size must be {}", MIN_PAGE_SIZE),
        ))
    } else if page_size > MAX_PAGE_SIZE {
        Some(FieldViolation::new(
            "page_size",
            format!("maximum page size must be {}", MAX_PAGE_SIZE),
        ))
    } else {
        None
    }
}

/// Parse a currency that already passed [`validate_currency`]
pub fn parse_currency(value: &str) -> Result<Currency, RpcError> {
    value.parse::<Currency>().map_err(|_| {
        RpcError::invalid_argument(vec![FieldViolation::new(
            "currency",
            "unsupported currency",
        )])
    })
}
