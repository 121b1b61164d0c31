//! MongoDB-backed transaction sessions.

use async_trait::async_trait;
use mongodb::ClientSession;

use dinemap_core::{
    backend::StoreSession,
    error::{StoreError, StoreResult},
};

/// A caller-managed transaction session wrapping the driver's `ClientSession`.
///
/// The store threads this into every operation issued under it; commit and
/// rollback stay entirely in the caller's hands.
pub struct MongoSession {
    pub(crate) inner: ClientSession,
}

impl MongoSession {
    pub(crate) fn new(inner: ClientSession) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StoreSession for MongoSession {
    async fn start_transaction(&mut self) -> StoreResult<()> {
        self.inner
            .start_transaction()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))
    }

    async fn commit_transaction(&mut self) -> StoreResult<()> {
        self.inner
            .commit_transaction()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))
    }

    async fn abort_transaction(&mut self) -> StoreResult<()> {
        self.inner
            .abort_transaction()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))
    }
}
