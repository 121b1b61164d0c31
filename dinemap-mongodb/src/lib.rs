//! MongoDB backend implementation for the dinemap restaurant directory.
//!
//! This crate provides a MongoDB-based implementation of the directory's
//! `StoreBackend` trait: native filter translation, `$inc` counter updates
//! through `findOneAndUpdate`/`updateMany`, `$geoNear` proximity
//! aggregation, and `ClientSession`-backed transactions.
//!
//! To use this backend, enable the `mongodb` feature on the facade crate:
//!
//! ```toml
//! [dependencies]
//! dinemap = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Indexes
//!
//! The `$geoNear` stage requires a 2dsphere index on the restaurant position
//! field; running the directory's shipped migrations creates it.
//!
//! # Example
//!
//! ```ignore
//! use dinemap_mongodb::MongoDbStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "dinemap")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as dinemap_mongodb;

pub mod query;
pub mod session;
pub mod store;

pub use session::MongoSession;
pub use store::{MongoDbStore, MongoDbStoreBuilder};
