//! Bank RPC service
//!
//! One method per RPC. Every method follows the same pipeline: authorize
//! (unless public), validate the request, call the business component,
//! translate its error into an [`RpcError`].

use std::sync::Arc;

use chrono::Duration;

use crate::account::AccountLedger;
use crate::api_auth::AuthorizationGate;
use crate::config::TokenConfig;
use crate::core_types::Role;
use crate::store::Store;
use crate::token::TokenMaker;
use crate::transfer::TransferOrchestrator;
use crate::user_auth::SessionLifecycle;

/// Any authenticated caller
pub(crate) const ANY_ROLE: &[Role] = &[Role::Banker, Role::Depositor];
pub(crate) const BANKER_ONLY: &[Role] = &[Role::Banker];

pub struct BankService {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) gate: AuthorizationGate,
    pub(crate) sessions: SessionLifecycle,
    pub(crate) ledger: AccountLedger,
    pub(crate) transfers: TransferOrchestrator,
}

impl BankService {
    pub fn new(
        store: Arc<dyn Store>,
        token_maker: Arc<dyn TokenMaker>,
        access_token_duration: Duration,
        refresh_token_duration: Duration,
    ) -> Self {
        Self {
            gate: AuthorizationGate::new(token_maker.clone()),
            sessions: SessionLifecycle::new(
                store.clone(),
                token_maker,
                access_token_duration,
                refresh_token_duration,
            ),
            ledger: AccountLedger::new(store.clone()),
            transfers: TransferOrchestrator::new(store.clone()),
            store,
        }
    }

    pub fn from_config(
        store: Arc<dyn Store>,
        token_maker: Arc<dyn TokenMaker>,
        config: &TokenConfig,
    ) -> Self {
        Self::new(
            store,
            token_maker,
            config.access_token_duration(),
            config.refresh_token_duration(),
        )
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn sessions(&self) -> &SessionLifecycle {
        &self.sessions
    }
}
