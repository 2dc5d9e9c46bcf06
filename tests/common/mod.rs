//! Shared fixtures: a [`BankService`] over the in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;
use simple_bank::account::Account;
use simple_bank::api_auth::RequestContext;
use simple_bank::core_types::Role;
use simple_bank::rpc::*;
use simple_bank::store::{MemoryStore, Store};
use simple_bank::token::{LocalTokenMaker, TokenMaker};
use simple_bank::user_auth::{CreateUserParams, hash_password};

pub const KEY: &[u8] = b"12345678901234567890123456789012";
pub const PASSWORD: &str = "secret123";

pub struct Harness {
    pub service: Arc<BankService>,
    pub store: Arc<MemoryStore>,
    pub maker: Arc<dyn TokenMaker>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let maker: Arc<dyn TokenMaker> = Arc::new(LocalTokenMaker::new(KEY).unwrap());
        let service = BankService::new(
            store.clone(),
            maker.clone(),
            Duration::minutes(15),
            Duration::hours(24),
        );
        Self {
            service: Arc::new(service),
            store,
            maker,
        }
    }

    /// Depositors sign up through CreateUser; bankers are seeded in the
    /// store the way an operator would provision them.
    pub async fn register(&self, username: &str, role: Role) {
        match role {
            Role::Depositor => {
                self.service
                    .create_user(CreateUserRequest {
                        username: username.to_string(),
                        full_name: "Test User".to_string(),
                        email: format!("{}@example.com", username),
                        password: PASSWORD.to_string(),
                    })
                    .await
                    .unwrap();
            }
            Role::Banker => {
                self.store
                    .create_user(CreateUserParams {
                        username: username.to_string(),
                        role: Role::Banker,
                        hashed_password: hash_password(PASSWORD).unwrap(),
                        full_name: "Test Banker".to_string(),
                        email: format!("{}@example.com", username),
                    })
                    .await
                    .unwrap();
            }
        }
    }

    pub async fn login(&self, username: &str) -> (RequestContext, LoginUserResponse) {
        let resp = self
            .service
            .login_user(
                &RequestContext::new("integration-test/1.0", "127.0.0.1"),
                LoginUserRequest {
                    username: username.to_string(),
                    password: PASSWORD.to_string(),
                },
            )
            .await
            .unwrap();
        let ctx = RequestContext::new("integration-test/1.0", "127.0.0.1")
            .with_bearer(&resp.access_token);
        (ctx, resp)
    }

    /// Register and log in
    pub async fn user(&self, username: &str, role: Role) -> RequestContext {
        self.register(username, role).await;
        self.login(username).await.0
    }

    /// Open an account through `banker` and fund it with `balance`
    pub async fn funded_account(
        &self,
        banker: &RequestContext,
        owner: &str,
        currency: &str,
        balance: i64,
    ) -> Account {
        let account = self
            .service
            .create_account(
                banker,
                CreateAccountRequest {
                    username: owner.to_string(),
                    currency: currency.to_string(),
                },
            )
            .await
            .unwrap()
            .account;
        if balance == 0 {
            return account;
        }
        self.service
            .update_account(
                banker,
                UpdateAccountRequest {
                    id: account.id,
                    amount: balance,
                },
            )
            .await
            .unwrap()
            .account
    }
}

pub fn transfer(from: i64, to: i64, amount: i64, currency: &str) -> CreateTransferRequest {
    CreateTransferRequest {
        from_account_id: from,
        to_account_id: to,
        amount,
        currency: currency.to_string(),
    }
}
