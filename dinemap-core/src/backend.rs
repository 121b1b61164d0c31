//! Storage backend abstraction for the directory.
//!
//! [`StoreBackend`] is the contract between the directory's operations and a
//! concrete document store. It covers the directory's full storage surface:
//! point reads, filtered/sorted/paged fetches, counts, atomic single- and
//! multi-document field updates, the spherical geo-radius primitive, and
//! caller-managed transaction sessions.
//!
//! # Sessions
//!
//! A [`StoreSession`] is a unit-of-work value owned entirely by the caller:
//! the directory threads it into the store calls it makes on the caller's
//! behalf and never commits or aborts it itself. Mutations issued through a
//! session with an active transaction commit or roll back together; mutations
//! issued without a session (or outside a transaction) apply immediately.
//!
//! # Thread Safety
//!
//! Implementations must be thread-safe and support concurrent access from
//! multiple async tasks. No method spawns background work; each suspends the
//! calling task until its store round trip completes.

use async_trait::async_trait;
use bson::{Bson, Uuid};
use std::fmt::Debug;

use crate::{
    error::StoreResult,
    geo::GeoNear,
    query::{Expr, Query},
    update::Update,
};

/// A caller-managed transaction context spanning one or more store operations.
///
/// Starting a transaction while one is active, or committing/aborting without
/// one, is a [`Transaction`](crate::error::StoreError::Transaction) error.
#[async_trait]
pub trait StoreSession: Send {
    /// Begins a transaction on this session.
    async fn start_transaction(&mut self) -> StoreResult<()>;

    /// Commits the active transaction, making all mutations issued through
    /// this session durable together.
    async fn commit_transaction(&mut self) -> StoreResult<()>;

    /// Aborts the active transaction, rolling back every mutation issued
    /// through this session since it began.
    async fn abort_transaction(&mut self) -> StoreResult<()>;
}

/// Abstract interface for the directory's document storage.
///
/// Reads that match nothing return `Ok(None)` or an empty vector, never an
/// error. Transport and connection failures surface as
/// [`Unavailable`](crate::error::StoreError::Unavailable).
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// The transaction session type this backend hands out.
    type Session: StoreSession;

    /// Starts a new session for caller-managed transactions.
    async fn start_session(&self) -> StoreResult<Self::Session>;

    /// Inserts a new document under the given identity.
    ///
    /// The collection is created automatically if it does not exist. Inserting
    /// an identity that already exists is an error.
    async fn insert_document(
        &self,
        id: Uuid,
        document: Bson,
        collection: &str,
    ) -> StoreResult<()>;

    /// Returns one document matching the filter, or `None`.
    ///
    /// Which document is returned when several match is backend-defined.
    async fn find_one(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> StoreResult<Option<Bson>>;

    /// Returns all documents matching the query, honoring its sort, skip,
    /// and limit.
    async fn find(&self, query: Query, collection: &str) -> StoreResult<Vec<Bson>>;

    /// Counts documents matching the filter.
    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
    ) -> StoreResult<u64>;

    /// Atomically applies the update to one document matching the filter and
    /// returns the post-update document, or `None` if nothing matched.
    ///
    /// When a session is supplied, the mutation participates in its
    /// transaction (if one is active).
    async fn find_one_and_update(
        &self,
        filter: Expr,
        update: Update,
        session: Option<&mut Self::Session>,
        collection: &str,
    ) -> StoreResult<Option<Bson>>;

    /// Applies the update to every document matching the filter in one
    /// multi-document operation. Returns the matched count.
    async fn update_many(
        &self,
        filter: Expr,
        update: Update,
        session: Option<&mut Self::Session>,
        collection: &str,
    ) -> StoreResult<u64>;

    /// Runs a spherical geo-radius query.
    ///
    /// Results are ordered nearest-first and annotated with the computed
    /// distance; documents lacking the queried geo field are excluded by
    /// construction.
    async fn geo_near(&self, near: GeoNear, collection: &str) -> StoreResult<Vec<Bson>>;

    /// Creates a new collection with the given name.
    async fn create_collection(&self, name: &str) -> StoreResult<()>;

    /// Drops (deletes) a collection and all its documents.
    async fn drop_collection(&self, name: &str) -> StoreResult<()>;

    /// Lists the names of all collections in the store.
    async fn list_collections(&self) -> StoreResult<Vec<String>>;

    /// Creates an index on a field, optionally enforcing uniqueness.
    async fn add_index(&self, collection: &str, field: &str, unique: bool) -> StoreResult<()>;

    /// Creates a spherical geo index on a GeoJSON point field, enabling
    /// [`geo_near`](StoreBackend::geo_near) against it.
    async fn add_geo_index(&self, collection: &str, field: &str) -> StoreResult<()>;

    /// Retrieves the store's current schema revision id, if any.
    async fn current_revision_id(&self) -> StoreResult<Option<String>>;

    /// Sets the store's schema revision id.
    async fn set_revision_id(&self, revision_id: &str) -> StoreResult<()>;
}
