//! Undo-log transaction sessions for the in-memory store.
//!
//! A [`MemorySession`] shares the store's state and records the pre-image of
//! every document mutated through it while a transaction is active. Abort
//! restores the pre-images in reverse order; commit discards them. Mutations
//! issued outside a transaction apply immediately and record nothing.

use async_trait::async_trait;
use bson::Bson;
use mea::rwlock::RwLock;
use std::sync::Arc;

use dinemap_core::{
    backend::StoreSession,
    error::{StoreError, StoreResult},
};

use crate::store::StoreMap;

struct UndoEntry {
    collection: String,
    key: String,
    previous: Bson,
}

/// A caller-managed transaction session over the in-memory store.
pub struct MemorySession {
    store: Arc<RwLock<StoreMap>>,
    active: bool,
    undo: Vec<UndoEntry>,
}

impl MemorySession {
    pub(crate) fn new(store: Arc<RwLock<StoreMap>>) -> Self {
        Self {
            store,
            active: false,
            undo: Vec::new(),
        }
    }

    /// Records a document pre-image, if a transaction is active.
    ///
    /// Called by the store with its write lock held; this only appends to the
    /// session-local log and never locks.
    pub(crate) fn record(&mut self, collection: &str, key: &str, previous: Bson) {
        if self.active {
            self.undo.push(UndoEntry {
                collection: collection.to_string(),
                key: key.to_string(),
                previous,
            });
        }
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn start_transaction(&mut self) -> StoreResult<()> {
        if self.active {
            return Err(StoreError::Transaction(
                "transaction already in progress".to_string(),
            ));
        }

        self.active = true;
        Ok(())
    }

    async fn commit_transaction(&mut self) -> StoreResult<()> {
        if !self.active {
            return Err(StoreError::Transaction(
                "no transaction to commit".to_string(),
            ));
        }

        self.active = false;
        self.undo.clear();
        Ok(())
    }

    async fn abort_transaction(&mut self) -> StoreResult<()> {
        if !self.active {
            return Err(StoreError::Transaction(
                "no transaction to abort".to_string(),
            ));
        }

        log::debug!("rolling back {} document mutation(s)", self.undo.len());

        let mut store = self.store.write().await;
        for entry in self.undo.drain(..).rev() {
            if let Some(collection_map) = store.get_mut(&entry.collection) {
                collection_map.insert(entry.key, entry.previous);
            }
        }

        self.active = false;
        Ok(())
    }
}
