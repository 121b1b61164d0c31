//! In-memory storage backend for the dinemap restaurant directory.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! directory's `StoreBackend` trait, including the spherical geo-radius
//! primitive and undo-log transaction sessions. It is ideal for development
//! and testing - every directory operation, including bookmark transactions
//! and proximity search, behaves like the persistent backend without a
//! running database.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using an
//!   async-aware RwLock
//! - **Full query support** - Filtering, sorting, pagination, counts
//! - **Geo-radius queries** - Haversine great-circle distances with
//!   nearest-first ordering and distance annotation
//! - **Transactions** - Caller-managed sessions with pre-image rollback
//!
//! # Quick Start
//!
//! ```ignore
//! use dinemap_core::directory::RestaurantDirectory;
//! use dinemap_memory::InMemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = RestaurantDirectory::new(InMemoryStore::new());
//!     directory.run_migrations().await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as dinemap_memory;

pub mod evaluator;
pub mod session;
pub mod spherical;
pub mod store;

pub use session::MemorySession;
pub use store::InMemoryStore;
