//! Schema migrations for the directory.
//!
//! Migrations form a linear chain ordered by `previous_id` links; the runner
//! walks the chain from the store's current revision, applying each step and
//! recording its id as the new revision. Downgrades walk the same chain in
//! reverse.
//!
//! The directory ships its own chain ([`directory_migrations`]): collection
//! and index setup, plus the explicit bookmark-counter backfill that
//! normalizes records written before the counter existed.
//!
//! # Example
//!
//! ```ignore
//! use dinemap_core::migrate::{MigrationRunner, directory_migrations};
//!
//! let runner = MigrationRunner::new(directory_migrations())?;
//! runner.upgrade(&backend).await?;
//! ```

use async_trait::async_trait;

use crate::{
    backend::StoreBackend,
    document::Document,
    error::{StoreError, StoreResult},
    query::{Expr, Filter},
    restaurant::Restaurant,
    update::Update,
};

/// A single migration step in the schema evolution chain.
#[async_trait]
pub trait Migration<B: StoreBackend>: Send + Sync {
    /// Unique identifier for this migration; recorded as the store revision
    /// once applied.
    fn id(&self) -> &'static str;

    /// The id of the migration this one follows; `None` for the first.
    fn previous_id(&self) -> Option<&'static str>;

    /// Applies this migration.
    async fn up(&self, op: &MigrateOp<'_, B>) -> StoreResult<()>;

    /// Reverses this migration.
    async fn down(&self, op: &MigrateOp<'_, B>) -> StoreResult<()>;
}

/// Operation context handed to migrations: the slice of the backend surface a
/// schema step may touch.
pub struct MigrateOp<'a, B: StoreBackend> {
    backend: &'a B,
}

impl<'a, B: StoreBackend> MigrateOp<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub async fn create_collection(&self, name: &str) -> StoreResult<()> {
        self.backend.create_collection(name).await
    }

    pub async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        self.backend.drop_collection(name).await
    }

    pub async fn add_index(&self, collection: &str, field: &str, unique: bool) -> StoreResult<()> {
        self.backend
            .add_index(collection, field, unique)
            .await
    }

    pub async fn add_geo_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.backend
            .add_geo_index(collection, field)
            .await
    }

    /// Applies an update to every matching document, outside any session.
    pub async fn update_many(
        &self,
        collection: &str,
        filter: Expr,
        update: Update,
    ) -> StoreResult<u64> {
        self.backend
            .update_many(filter, update, None, collection)
            .await
    }
}

/// Runs a linear chain of migrations against a backend.
pub struct MigrationRunner<B: StoreBackend> {
    chain: Vec<Box<dyn Migration<B>>>,
}

impl<B: StoreBackend> std::fmt::Debug for MigrationRunner<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRunner")
            .field(
                "chain",
                &self.chain.iter().map(|m| m.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<B: StoreBackend> MigrationRunner<B> {
    /// Builds a runner from a migration chain.
    ///
    /// The chain must be linear and ordered: the first migration has no
    /// predecessor, every later one names the migration before it.
    pub fn new(chain: Vec<Box<dyn Migration<B>>>) -> StoreResult<Self> {
        for (index, migration) in chain.iter().enumerate() {
            let expected = if index == 0 {
                None
            } else {
                Some(chain[index - 1].id())
            };

            if migration.previous_id() != expected {
                return Err(StoreError::Migration(format!(
                    "migration '{}' is out of order: expected previous {:?}, found {:?}",
                    migration.id(),
                    expected,
                    migration.previous_id()
                )));
            }
        }

        Ok(Self { chain })
    }

    fn position_of(&self, revision: &str) -> StoreResult<usize> {
        self.chain
            .iter()
            .position(|m| m.id() == revision)
            .ok_or_else(|| {
                StoreError::Migration(format!("unknown revision '{revision}'"))
            })
    }

    /// Applies every migration after the store's current revision, in order.
    pub async fn upgrade(&self, backend: &B) -> StoreResult<()> {
        let current = backend.current_revision_id().await?;
        let start = match current.as_deref() {
            Some(revision) => self.position_of(revision)? + 1,
            None => 0,
        };

        let op = MigrateOp::new(backend);
        for migration in &self.chain[start..] {
            log::info!("applying migration '{}'", migration.id());
            migration.up(&op).await?;
            backend.set_revision_id(migration.id()).await?;
        }

        Ok(())
    }

    /// Reverses migrations from the store's current revision down to (and
    /// excluding) the target revision.
    pub async fn downgrade_to(&self, backend: &B, target: &str) -> StoreResult<()> {
        let current = backend
            .current_revision_id()
            .await?
            .ok_or_else(|| StoreError::Migration("store has no revision to downgrade from".to_string()))?;

        let from = self.position_of(&current)?;
        let to = self.position_of(target)?;
        if to > from {
            return Err(StoreError::Migration(format!(
                "cannot downgrade forward from '{current}' to '{target}'"
            )));
        }

        let op = MigrateOp::new(backend);
        for migration in self.chain[to + 1..=from].iter().rev() {
            log::info!("reverting migration '{}'", migration.id());
            migration.down(&op).await?;
        }
        backend.set_revision_id(target).await?;

        Ok(())
    }
}

/// The directory's shipped migration chain.
pub fn directory_migrations<B: StoreBackend>() -> Vec<Box<dyn Migration<B>>> {
    vec![
        Box::new(CreateRestaurants),
        Box::new(BackfillBookmarkCounts),
    ]
}

/// Creates the restaurant collection with its name and geo indexes.
pub struct CreateRestaurants;

#[async_trait]
impl<B: StoreBackend> Migration<B> for CreateRestaurants {
    fn id(&self) -> &'static str {
        "create_restaurants"
    }

    fn previous_id(&self) -> Option<&'static str> {
        None
    }

    async fn up(&self, op: &MigrateOp<'_, B>) -> StoreResult<()> {
        let collection = Restaurant::collection_name();

        op.create_collection(collection).await?;
        // Names are a lookup key but not unique across the directory.
        op.add_index(collection, "name", false).await?;
        op.add_geo_index(collection, "position").await?;

        Ok(())
    }

    async fn down(&self, op: &MigrateOp<'_, B>) -> StoreResult<()> {
        op.drop_collection(Restaurant::collection_name())
            .await
    }
}

/// Sets the bookmark counter to 0 on every record missing it.
///
/// Idempotent: a second run matches nothing. Down is a no-op, since there is
/// no way to tell a backfilled 0 from a genuine one.
pub struct BackfillBookmarkCounts;

#[async_trait]
impl<B: StoreBackend> Migration<B> for BackfillBookmarkCounts {
    fn id(&self) -> &'static str {
        "backfill_bookmark_counts"
    }

    fn previous_id(&self) -> Option<&'static str> {
        Some("create_restaurants")
    }

    async fn up(&self, op: &MigrateOp<'_, B>) -> StoreResult<()> {
        op.update_many(
            Restaurant::collection_name(),
            Filter::not_exists("bookmarkCount"),
            Update::set("bookmarkCount", 0_i64),
        )
        .await?;

        Ok(())
    }

    async fn down(&self, _op: &MigrateOp<'_, B>) -> StoreResult<()> {
        Ok(())
    }
}
