//! Convenient re-exports of commonly used types from dinemap.
//!
//! ```ignore
//! use dinemap::prelude::*;
//! ```
//!
//! This provides access to:
//! - The restaurant entity and its creation/result shapes
//! - The directory operations and composite query type
//! - Pagination requests and results
//! - Store backend and session traits
//! - Error types and migration tools

pub use dinemap_core::{
    backend::{StoreBackend, StoreSession},
    directory::{MAX_NEAR_DISTANCE_M, RestaurantDirectory, RestaurantQuery},
    document::{Document, DocumentExt},
    error::{StoreError, StoreResult},
    geo::{GeoNear, GeoPoint},
    migrate::{MigrateOp, Migration, MigrationRunner, directory_migrations},
    page::{Page, PageRequest},
    query::{Expr, Filter, FieldOp, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
    restaurant::{NearbyRestaurant, NewRestaurant, Restaurant},
    update::{Update, UpdateOp},
};
