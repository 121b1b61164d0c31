//! In-memory storage implementation of the directory's store backend.
//!
//! Documents are stored as BSON values in ordered maps behind an async-aware
//! read-write lock. Collections iterate in identity order, so unsorted reads
//! are deterministic.
//!
//! # Thread Safety
//!
//! `InMemoryStore` is cloneable and uses `Arc`-wrapped internal state;
//! multiple clones of the same instance share the same underlying data.
//!
//! # Performance
//!
//! Queries scan all documents in a collection (no indexing); the index
//! management methods are accepted as no-ops so migrations run unchanged.
//! Fine for tests and small datasets.

use async_trait::async_trait;
use bson::{Bson, Uuid};
use mea::rwlock::RwLock;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use dinemap_core::{
    backend::StoreBackend,
    error::{StoreError, StoreResult},
    geo::GeoNear,
    query::{Expr, Query, SortDirection},
    update::Update,
};

use crate::{
    evaluator::{Comparable, DocumentEvaluator, apply_update, filter_documents},
    session::MemorySession,
    spherical::{haversine_distance_m, point_coordinates},
};

/// Documents of one collection, keyed by identity string. A `BTreeMap` keeps
/// iteration in identity order.
pub(crate) type CollectionMap = BTreeMap<String, Bson>;
pub(crate) type StoreMap = HashMap<String, CollectionMap>;

/// Thread-safe in-memory document store.
///
/// # Example
///
/// ```ignore
/// use dinemap_memory::InMemoryStore;
/// use dinemap_core::directory::RestaurantDirectory;
///
/// let directory = RestaurantDirectory::new(InMemoryStore::new());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// The main storage map: collection name -> (document id -> document)
    store: Arc<RwLock<StoreMap>>,
    /// Current revision id for tracking schema versions
    current_revision: Arc<RwLock<Option<String>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(StoreMap::new())),
            current_revision: Arc::new(RwLock::new(None)),
        }
    }

    fn matches(document: &Bson, filter: Option<&Expr>) -> bool {
        match filter {
            Some(expr) => DocumentEvaluator::new(document)
                .evaluate(expr)
                .unwrap_or(false),
            None => true,
        }
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    type Session = MemorySession;

    async fn start_session(&self) -> StoreResult<Self::Session> {
        Ok(MemorySession::new(self.store.clone()))
    }

    async fn insert_document(
        &self,
        id: Uuid,
        document: Bson,
        collection: &str,
    ) -> StoreResult<()> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.to_string())
            .or_default();

        let key = id.to_string();
        if collection_map.contains_key(&key) {
            return Err(StoreError::DocumentAlreadyExists(key, collection.to_string()));
        }

        collection_map.insert(key, document);
        Ok(())
    }

    async fn find_one(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> StoreResult<Option<Bson>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(None);
        };

        Ok(collection_map
            .values()
            .find(|doc| Self::matches(doc, filter.as_ref()))
            .cloned())
    }

    async fn find(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut documents = match &query.filter {
            Some(filter) => filter_documents(collection_map.values(), filter),
            None => collection_map.values().cloned().collect::<Vec<_>>(),
        };

        if let Some(sort) = &query.sort {
            documents.sort_by(|a, b| {
                let left = a
                    .as_document()
                    .and_then(|doc| doc.get(&sort.field))
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);
                let right = b
                    .as_document()
                    .and_then(|doc| doc.get(&sort.field))
                    .map(Comparable::from)
                    .unwrap_or(Comparable::Null);

                match sort.direction {
                    SortDirection::Asc => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
                    SortDirection::Desc => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
                }
            });
        }

        Ok(documents
            .into_iter()
            .skip(query.offset.unwrap_or(0))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> StoreResult<u64> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(0);
        };

        Ok(collection_map
            .values()
            .filter(|doc| Self::matches(doc, filter.as_ref()))
            .count() as u64)
    }

    async fn find_one_and_update(
        &self,
        filter: Expr,
        update: Update,
        session: Option<&mut Self::Session>,
        collection: &str,
    ) -> StoreResult<Option<Bson>> {
        let mut store = self.store.write().await;
        // A missing collection behaves as empty, like any store-native
        // conditional update.
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(None);
        };

        let Some(key) = collection_map
            .iter()
            .find(|(_, doc)| Self::matches(doc, Some(&filter)))
            .map(|(key, _)| key.clone())
        else {
            return Ok(None);
        };

        let Some(document) = collection_map.get_mut(&key) else {
            return Ok(None);
        };

        if let Some(session) = session {
            session.record(collection, &key, document.clone());
        }

        let fields = document
            .as_document_mut()
            .ok_or_else(|| StoreError::Serialization("expected a BSON document".to_string()))?;
        apply_update(fields, &update)?;

        Ok(Some(document.clone()))
    }

    async fn update_many(
        &self,
        filter: Expr,
        update: Update,
        mut session: Option<&mut Self::Session>,
        collection: &str,
    ) -> StoreResult<u64> {
        let mut store = self.store.write().await;
        let Some(collection_map) = store.get_mut(collection) else {
            return Ok(0);
        };

        let keys = collection_map
            .iter()
            .filter(|(_, doc)| Self::matches(doc, Some(&filter)))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();

        for key in &keys {
            let Some(document) = collection_map.get_mut(key) else {
                continue;
            };

            if let Some(session) = session.as_deref_mut() {
                session.record(collection, key, document.clone());
            }

            let fields = document
                .as_document_mut()
                .ok_or_else(|| StoreError::Serialization("expected a BSON document".to_string()))?;
            apply_update(fields, &update)?;
        }

        Ok(keys.len() as u64)
    }

    async fn geo_near(&self, near: GeoNear, collection: &str) -> StoreResult<Vec<Bson>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut matches = Vec::new();
        for document in collection_map.values() {
            if !Self::matches(document, near.filter.as_ref()) {
                continue;
            }

            // Documents without a well-formed point are outside the query by
            // construction, not by explicit filtering.
            let Some((longitude, latitude)) = point_coordinates(document, &near.key) else {
                continue;
            };

            let meters = haversine_distance_m(
                near.center.longitude(),
                near.center.latitude(),
                longitude,
                latitude,
            );
            if meters > near.max_distance_m {
                continue;
            }

            let mut annotated = document
                .as_document()
                .cloned()
                .ok_or_else(|| StoreError::Serialization("expected a BSON document".to_string()))?;
            annotated.insert(
                near.distance_field.clone(),
                Bson::Double(meters * near.distance_multiplier),
            );

            matches.push((meters, Bson::Document(annotated)));
        }

        matches.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        Ok(matches
            .into_iter()
            .map(|(_, document)| document)
            .collect())
    }

    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        let mut store = self.store.write().await;

        if store.remove(name).is_none() {
            return Err(StoreError::CollectionNotFound(name.to_string()));
        }

        Ok(())
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .store
            .read()
            .await
            .keys()
            .cloned()
            .collect())
    }

    async fn add_index(&self, _collection: &str, _field: &str, _unique: bool) -> StoreResult<()> {
        // In-memory store does not index (no-op)
        Ok(())
    }

    async fn add_geo_index(&self, _collection: &str, _field: &str) -> StoreResult<()> {
        // In-memory store does not index (no-op)
        Ok(())
    }

    async fn current_revision_id(&self) -> StoreResult<Option<String>> {
        Ok(self
            .current_revision
            .read()
            .await
            .clone())
    }

    async fn set_revision_id(&self, revision_id: &str) -> StoreResult<()> {
        let mut guard = self.current_revision.write().await;
        *guard = Some(revision_id.to_string());

        Ok(())
    }
}
