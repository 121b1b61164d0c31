//! Core of the dinemap restaurant directory: a data-access layer over
//! document stores.
//!
//! This crate provides:
//!
//! - **The restaurant entity** ([`restaurant`]) - The sole stored record and
//!   its creation/result shapes
//! - **Directory operations** ([`directory`]) - Record store, paginator,
//!   proximity search, and the bookmark counter
//! - **Store backend abstraction** ([`backend`]) - The storage interface and
//!   caller-managed transaction sessions
//! - **Query and filtering API** ([`query`]) - The fixed filter shapes the
//!   directory issues
//! - **Pagination types** ([`page`]) - 1-based page requests and page results
//! - **Geospatial types** ([`geo`]) - GeoJSON points and radius queries
//! - **Update descriptors** ([`update`]) - Counter increments and backfills
//! - **Error handling** ([`error`]) - Error taxonomy and result type
//! - **Schema migrations** ([`migrate`]) - Linear migration chain including
//!   the bookmark-counter backfill
//!
//! # Example
//!
//! ```ignore
//! use dinemap_core::{directory::RestaurantDirectory, restaurant::NewRestaurant};
//!
//! let directory = RestaurantDirectory::new(backend);
//! directory.run_migrations().await?;
//!
//! let created = directory.create(NewRestaurant {
//!     name: "Mingles".to_string(),
//!     country: "KR".to_string(),
//!     ..NewRestaurant::default()
//! }).await?;
//!
//! let found = directory.find_by_name("Mingles").await?;
//! assert_eq!(found.map(|r| r.id), Some(created.id));
//! ```

#[allow(unused_extern_crates)]
extern crate self as dinemap_core;

pub mod backend;
pub mod directory;
pub mod document;
pub mod error;
pub mod geo;
pub mod migrate;
pub mod page;
pub mod query;
pub mod restaurant;
pub mod update;
