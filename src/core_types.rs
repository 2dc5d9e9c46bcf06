//! Core types used throughout the system
//!
//! Identifiers, roles and currencies shared by every layer. Roles and
//! currencies are closed enums: adding a variant is a compile-time change
//! that every `match` at an authorization or validation point must handle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Account ID - primary key of the `accounts` table.
///
/// Also the canonical lock order: transactions touching several accounts
/// lock them in ascending `AccountId`.
pub type AccountId = i64;

/// Transfer ID - primary key of the `transfers` table
pub type TransferId = i64;

/// Entry ID - primary key of the `entries` table
pub type EntryId = i64;

/// Amount in minor currency units (cents, thebe, ...)
pub type MinorUnits = i64;

// ============================================================================
// Role
// ============================================================================

/// Role carried by a token and stored on the user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Depositor,
    Banker,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Depositor => "depositor",
            Role::Banker => "banker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "depositor" => Ok(Role::Depositor),
            "banker" => Ok(Role::Banker),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// Currency
// ============================================================================

/// Supported account currencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Currency {
    USD,
    ZAR,
    BWP,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::USD, Currency::ZAR, Currency::BWP];

    pub fn as_str(self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::ZAR => "ZAR",
            Currency::BWP => "BWP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = UnknownVariant;

    /// Exact, case-sensitive match: "usd" is not a supported currency.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Currency::USD),
            "ZAR" => Ok(Currency::ZAR),
            "BWP" => Ok(Currency::BWP),
            other => Err(UnknownVariant {
                kind: "currency",
                value: other.to_string(),
            }),
        }
    }
}

/// Parse failure for a closed enum stored as text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
