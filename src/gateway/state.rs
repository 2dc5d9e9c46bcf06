use std::sync::Arc;

use crate::rpc::BankService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BankService>,
}

impl AppState {
    pub fn new(service: Arc<BankService>) -> Self {
        Self { service }
    }
}
