//! Refresh-session persistence

use std::sync::Arc;

use uuid::Uuid;

use super::models::{CreateSessionParams, Session};
use crate::store::{Store, StoreError};

/// One session row per login, keyed by the refresh token id
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn Store>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, params: CreateSessionParams) -> Result<Session, StoreError> {
        self.store.create_session(params).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Session, StoreError> {
        self.store.get_session(id).await
    }

    /// Renewals with a blocked session's refresh token are refused
    pub async fn block(&self, id: Uuid) -> Result<Session, StoreError> {
        let session = self.store.block_session(id).await?;
        tracing::info!(session_id = %id, username = %session.username, "Session blocked");
        Ok(session)
    }
}
