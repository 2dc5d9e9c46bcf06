//! Request and response contracts
//!
//! Missing request fields deserialize to their zero value and are then
//! rejected by validation, the same way an RPC framework treats unset
//! fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::error::FieldViolation;
use super::validation::{
    MAX_AMOUNT, RequestValidation, page_size_violation, validate_currency, validate_full_name,
    validate_username,
};
use crate::account::Account;
use crate::core_types::{AccountId, MinorUnits, TransferId};
use crate::transfer::Transfer;
use crate::user_auth::UserProfile;

// ============================================================================
// Users & sessions
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateUserRequest {
    #[schema(example = "alice")]
    #[validate(
        length(min = 3, max = 100, message = "must contain from 3-100 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[schema(example = "Alice Smith")]
    #[validate(
        length(min = 3, max = 100, message = "must contain from 3-100 characters"),
        custom(function = "validate_full_name")
    )]
    pub full_name: String,
    #[schema(example = "alice@example.com")]
    #[validate(
        length(min = 3, max = 200, message = "must contain from 3-200 characters"),
        email(message = "is not a valid email address")
    )]
    pub email: String,
    #[schema(example = "secret123")]
    #[validate(length(min = 6, max = 100, message = "must contain from 6-100 characters"))]
    pub password: String,
}

impl RequestValidation for CreateUserRequest {}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct LoginUserRequest {
    #[schema(example = "alice")]
    #[validate(
        length(min = 3, max = 100, message = "must contain from 3-100 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[schema(example = "secret123")]
    #[validate(length(min = 6, max = 100, message = "must contain from 6-100 characters"))]
    pub password: String,
}

impl RequestValidation for LoginUserRequest {}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginUserResponse {
    pub user: UserProfile,
    pub session_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct RenewAccessTokenRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub refresh_token: String,
}

impl RequestValidation for RenewAccessTokenRequest {}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RenewAccessTokenResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateAccountRequest {
    /// Owner of the new account
    #[schema(example = "alice")]
    #[validate(
        length(min = 3, max = 100, message = "must contain from 3-100 characters"),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[schema(example = "USD")]
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
}

impl RequestValidation for CreateAccountRequest {}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    pub account: Account,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct GetAccountRequest {
    #[schema(example = 1)]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub id: AccountId,
}

impl RequestValidation for GetAccountRequest {}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ListAccountsRequest {
    #[schema(example = 1)]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub page_id: i32,
    #[schema(example = 5)]
    pub page_size: i32,
}

impl RequestValidation for ListAccountsRequest {
    fn extra_violations(&self) -> Vec<FieldViolation> {
        page_size_violation(self.page_size).into_iter().collect()
    }
}

impl ListAccountsRequest {
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page_id as i64 - 1) * self.page_size as i64
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListAccountsResponse {
    pub accounts: Vec<Account>,
}

/// Administrative balance adjustment
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateAccountRequest {
    #[schema(example = 1)]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub id: AccountId,
    /// Signed delta in minor units
    pub amount: MinorUnits,
}

impl RequestValidation for UpdateAccountRequest {
    fn extra_violations(&self) -> Vec<FieldViolation> {
        if self.amount == 0 {
            vec![FieldViolation::new("amount", "must not be zero")]
        } else if self.amount.unsigned_abs() > MAX_AMOUNT as u64 {
            vec![FieldViolation::new(
                "amount",
                format!("must not exceed {} in absolute value", MAX_AMOUNT),
            )]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct DeleteAccountRequest {
    #[schema(example = 1)]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub id: AccountId,
    #[schema(example = "alice")]
    #[validate(
        length(min = 3, max = 100, message = "must contain from 3-100 characters"),
        custom(function = "validate_username")
    )]
    pub owner: String,
}

impl RequestValidation for DeleteAccountRequest {}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteAccountResponse {
    pub message: String,
}

// ============================================================================
// Transfers
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct CreateTransferRequest {
    #[schema(example = 1)]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub from_account_id: AccountId,
    #[schema(example = 2)]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub to_account_id: AccountId,
    #[schema(example = 10)]
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "must be a positive integer up to 1000000000"
    ))]
    pub amount: MinorUnits,
    #[schema(example = "USD")]
    #[validate(custom(function = "validate_currency"))]
    pub currency: String,
}

impl RequestValidation for CreateTransferRequest {
    fn extra_violations(&self) -> Vec<FieldViolation> {
        if self.from_account_id > 0 && self.from_account_id == self.to_account_id {
            vec![FieldViolation::new(
                "to_account_id",
                "must differ from from_account_id",
            )]
        } else {
            Vec::new()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct GetTransferRequest {
    #[schema(example = 1)]
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub id: TransferId,
}

impl RequestValidation for GetTransferRequest {}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferResponse {
    pub transfer: Transfer,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: crate::rpc::RpcError) -> Vec<String> {
        err.violations.into_iter().map(|v| v.field).collect()
    }

    #[test]
    fn test_empty_create_user_lists_every_field() {
        let err = CreateUserRequest::default().check().unwrap_err();
        let fields = fields(err);
        for field in ["email", "full_name", "password", "username"] {
            assert!(fields.iter().any(|f| f == field), "missing {}", field);
        }
    }

    #[test]
    fn test_valid_create_user() {
        let req = CreateUserRequest {
            username: "alice".into(),
            full_name: "Alice Smith".into(),
            email: "alice@example.com".into(),
            password: "secret123".into(),
        };
        assert!(req.check().is_ok());
    }

    #[test]
    fn test_transfer_amount_and_ids() {
        let req = CreateTransferRequest {
            from_account_id: 1,
            to_account_id: 2,
            amount: -5,
            currency: "USD".into(),
        };
        assert_eq!(fields(req.check().unwrap_err()), ["amount"]);

        let req = CreateTransferRequest {
            from_account_id: 0,
            to_account_id: -1,
            amount: 10,
            currency: "EUR".into(),
        };
        assert_eq!(
            fields(req.check().unwrap_err()),
            ["currency", "from_account_id", "to_account_id"]
        );
    }

    #[test]
    fn test_transfer_to_self_rejected() {
        let req = CreateTransferRequest {
            from_account_id: 3,
            to_account_id: 3,
            amount: 10,
            currency: "USD".into(),
        };
        assert_eq!(fields(req.check().unwrap_err()), ["to_account_id"]);
    }

    #[test]
    fn test_list_accounts_paging() {
        let req = ListAccountsRequest {
            page_id: 3,
            page_size: 5,
        };
        assert!(req.check().is_ok());
        assert_eq!(req.limit(), 5);
        assert_eq!(req.offset(), 10);

        let err = ListAccountsRequest {
            page_id: 0,
            page_size: 20,
        }
        .check()
        .unwrap_err();
        assert_eq!(fields(err), ["page_id", "page_size"]);
    }

    #[test]
    fn test_update_amount_must_be_nonzero() {
        let req = UpdateAccountRequest { id: 1, amount: 0 };
        assert_eq!(fields(req.check().unwrap_err()), ["amount"]);
        assert!(UpdateAccountRequest { id: 1, amount: -50 }.check().is_ok());
        let req = UpdateAccountRequest {
            id: 1,
            amount: -(MAX_AMOUNT + 1),
        };
        assert_eq!(fields(req.check().unwrap_err()), ["amount"]);
    }
}
