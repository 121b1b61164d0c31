//! dinemap - a restaurant directory data-access layer over document stores.
//!
//! This crate is the primary entry point for users of the dinemap framework.
//! It re-exports the core types and provides convenient access to the
//! storage backends.
//!
//! # Features
//!
//! - **Record store** - Create restaurants and fetch them by identity, name,
//!   or country
//! - **Paginated listings** - Four named query shapes over one shared
//!   pagination contract
//! - **Proximity search** - Same-country restaurants within 30 km, nearest
//!   first, annotated with distances in kilometers
//! - **Bookmark counter** - Atomic increments/decrements under caller-managed
//!   transaction sessions
//! - **Schema migrations** - Collection/index setup and the bookmark-counter
//!   backfill
//!
//! # Quick Start
//!
//! ```ignore
//! use dinemap::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> StoreResult<()> {
//!     let directory = RestaurantDirectory::new(InMemoryStore::new());
//!     directory.run_migrations().await?;
//!
//!     let created = directory
//!         .create(NewRestaurant {
//!             name: "Mingles".to_string(),
//!             cuisine: "Korean".to_string(),
//!             country: "KR".to_string(),
//!             longitude: 127.0276,
//!             latitude: 37.5244,
//!             ..NewRestaurant::default()
//!         })
//!         .await?;
//!
//!     // Paginated listing, 1-based pages.
//!     let page = directory.find_page(PageRequest::new(1, 20)).await?;
//!     assert_eq!(page.total_count, 1);
//!
//!     // Bookmarking runs under a caller-owned transaction session.
//!     let mut session = directory.start_session().await?;
//!     session.start_transaction().await?;
//!     directory.bookmark(created.id, &mut session).await?;
//!     session.commit_transaction().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb` feature)

pub mod prelude;

pub use dinemap_core::{
    backend, directory, document, error, geo, migrate, page, query, restaurant, update,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use dinemap_memory::{InMemoryStore, MemorySession};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use dinemap_mongodb::{MongoDbStore, MongoDbStoreBuilder, MongoSession};
}
