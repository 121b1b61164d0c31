//! The restaurant directory: every operation the data-access layer exposes.
//!
//! [`RestaurantDirectory`] wraps a [`StoreBackend`] and groups four
//! responsibilities over the one restaurant collection:
//!
//! - **Record store** - create and fetch-by-identity lookups
//! - **Paginator** - paged listings over four named filter shapes
//! - **Proximity search** - same-country restaurants within a fixed radius
//! - **Bookmark counter** - atomic counter updates under a caller session
//!
//! Each operation issues one or two store round trips and returns a detached
//! snapshot; nothing is cached or queued between calls.

use bson::Uuid;

use crate::{
    backend::StoreBackend,
    document::{Document, DocumentExt},
    error::{StoreError, StoreResult},
    geo::{GeoNear, GeoPoint},
    migrate::{MigrationRunner, directory_migrations},
    page::{Page, PageRequest},
    query::{Expr, Filter, Query, SortDirection},
    restaurant::{NearbyRestaurant, NewRestaurant, Restaurant},
    update::Update,
};

/// Radius cap for proximity searches, in meters. Bounds result size without
/// pagination; proximity lists are expected to be small and exploratory.
pub const MAX_NEAR_DISTANCE_M: f64 = 30_000.0;

/// The store computes distances in meters; results report kilometers.
const METERS_TO_KM: f64 = 0.001;

/// Document field the identity serializes under; also the pagination
/// tie-break sort key.
const ID_FIELD: &str = "id";

/// Document field holding the derived GeoJSON point.
const POSITION_FIELD: &str = "position";

/// Output field the geo-radius primitive annotates distances under.
const DISTANCE_FIELD: &str = "distance";

/// Document field holding the denormalized bookmark counter.
const BOOKMARK_COUNT_FIELD: &str = "bookmarkCount";

/// Composite filter for [`RestaurantDirectory::find_page_by_query`].
///
/// Every string field is matched as a case-insensitive substring; the
/// defaults (empty patterns, widest price range) make an unfilled query a
/// no-op filter that matches everything. A record is within the price range
/// when `record.min_price >= query.min_price` and
/// `record.max_price <= query.max_price`. All predicates are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantQuery {
    pub name: String,
    pub address: String,
    pub location: String,
    pub cuisine: String,
    pub award: String,
    pub country: String,
    pub min_price: i64,
    pub max_price: i64,
}

impl Default for RestaurantQuery {
    fn default() -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            location: String::new(),
            cuisine: String::new(),
            award: String::new(),
            country: String::new(),
            min_price: 0,
            max_price: i64::MAX,
        }
    }
}

impl RestaurantQuery {
    fn to_expr(&self) -> Expr {
        Filter::and([
            Filter::matches_ci("name", &self.name),
            Filter::matches_ci("address", &self.address),
            Filter::matches_ci("location", &self.location),
            Filter::gte("minPrice", self.min_price),
            Filter::lte("maxPrice", self.max_price),
            Filter::matches_ci("cuisine", &self.cuisine),
            Filter::matches_ci("award", &self.award),
            Filter::matches_ci("country", &self.country),
        ])
    }
}

/// The restaurant directory over a storage backend.
#[derive(Debug)]
pub struct RestaurantDirectory<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> RestaurantDirectory<B> {
    /// Creates a directory over the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns a reference to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Starts a caller-managed transaction session on the backend.
    pub async fn start_session(&self) -> StoreResult<B::Session> {
        self.backend.start_session().await
    }

    /// Applies the directory's shipped migration chain up to its head.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        MigrationRunner::new(directory_migrations())?
            .upgrade(&self.backend)
            .await
    }

    fn collection() -> &'static str {
        Restaurant::collection_name()
    }

    async fn find_one(&self, filter: Expr) -> StoreResult<Option<Restaurant>> {
        self.backend
            .find_one(Some(filter), Self::collection())
            .await?
            .map(Restaurant::from_bson)
            .transpose()
    }

    async fn find_many(&self, filter: Option<Expr>) -> StoreResult<Vec<Restaurant>> {
        let mut builder = Query::builder();
        if let Some(expr) = filter {
            builder = builder.filter(expr);
        }

        self.backend
            .find(builder.build(), Self::collection())
            .await?
            .into_iter()
            .map(Restaurant::from_bson)
            .collect()
    }

    // --- Record store -----------------------------------------------------

    /// Inserts a new restaurant, assigning its identity, and returns the
    /// created record.
    pub async fn create(&self, attrs: NewRestaurant) -> StoreResult<Restaurant> {
        let restaurant = Restaurant::assign(Uuid::new(), attrs);

        self.backend
            .insert_document(
                restaurant.id,
                restaurant.to_bson()?,
                Self::collection(),
            )
            .await?;

        Ok(restaurant)
    }

    /// Returns one restaurant with exactly this name, or `None`.
    pub async fn find_by_name(&self, name: &str) -> StoreResult<Option<Restaurant>> {
        self.find_one(Filter::eq("name", name)).await
    }

    /// Returns the restaurant with this identity, or `None`.
    pub async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Restaurant>> {
        self.find_one(Filter::eq(ID_FIELD, id)).await
    }

    /// Returns every restaurant with exactly this country. No ordering is
    /// guaranteed.
    pub async fn find_all_by_country(&self, country: &str) -> StoreResult<Vec<Restaurant>> {
        self.find_many(Some(Filter::eq("country", country)))
            .await
    }

    /// Counts restaurants with exactly this country.
    pub async fn count_by_country(&self, country: &str) -> StoreResult<u64> {
        self.backend
            .count_documents(Some(Filter::eq("country", country)), Self::collection())
            .await
    }

    /// Returns every restaurant in the directory.
    pub async fn find_all(&self) -> StoreResult<Vec<Restaurant>> {
        self.find_many(None).await
    }

    /// Sets the bookmark counter to 0 on every stored record missing it.
    ///
    /// Idempotent; returns the number of records touched. Also packaged as a
    /// migration so deployments normalize once at upgrade time instead of on
    /// the read path.
    pub async fn backfill_bookmark_counts(&self) -> StoreResult<u64> {
        let touched = self
            .backend
            .update_many(
                Filter::not_exists(BOOKMARK_COUNT_FIELD),
                Update::set(BOOKMARK_COUNT_FIELD, 0_i64),
                None,
                Self::collection(),
            )
            .await?;

        if touched > 0 {
            log::info!("backfilled bookmark counter on {touched} restaurants");
        }

        Ok(touched)
    }

    // --- Paginator --------------------------------------------------------

    /// One page over all restaurants.
    pub async fn find_page(&self, request: PageRequest) -> StoreResult<Page<Restaurant>> {
        self.paged(None, request).await
    }

    /// One page over restaurants with exactly this country.
    pub async fn find_page_by_country(
        &self,
        country: &str,
        request: PageRequest,
    ) -> StoreResult<Page<Restaurant>> {
        self.paged(Some(Filter::eq("country", country)), request)
            .await
    }

    /// One page over restaurants with exactly this cuisine.
    pub async fn find_page_by_cuisine(
        &self,
        cuisine: &str,
        request: PageRequest,
    ) -> StoreResult<Page<Restaurant>> {
        self.paged(Some(Filter::eq("cuisine", cuisine)), request)
            .await
    }

    /// One page over restaurants matching the composite query.
    pub async fn find_page_by_query(
        &self,
        query: &RestaurantQuery,
        request: PageRequest,
    ) -> StoreResult<Page<Restaurant>> {
        self.paged(Some(query.to_expr()), request).await
    }

    /// Shared pagination path for all listing variants.
    ///
    /// The count and the fetch are two independent round trips against the
    /// same filter, not a shared snapshot; under concurrent writers the total
    /// and the page contents can disagree. Records are sorted by identity
    /// ascending as a stable tie-break.
    async fn paged(
        &self,
        filter: Option<Expr>,
        request: PageRequest,
    ) -> StoreResult<Page<Restaurant>> {
        request.validate()?;

        let total_count = self
            .backend
            .count_documents(filter.clone(), Self::collection())
            .await?;

        let mut builder = Query::builder()
            .sort(ID_FIELD, SortDirection::Asc)
            .offset(request.skip() as usize)
            .limit(request.page_size as usize);
        if let Some(expr) = filter {
            builder = builder.filter(expr);
        }

        let records = self
            .backend
            .find(builder.build(), Self::collection())
            .await?
            .into_iter()
            .map(Restaurant::from_bson)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Page::assemble(records, total_count, &request))
    }

    // --- Proximity search -------------------------------------------------

    /// Returns restaurants in the same country as the pivot within 30 km of
    /// it, nearest first, each annotated with its distance in kilometers.
    ///
    /// Fails with [`StoreError::NotFound`] when the pivot id does not exist.
    /// The pivot itself matches its own radius query at distance ~0 and is
    /// returned first; excluding it is the caller's choice to make.
    pub async fn find_near_by_id(&self, id: Uuid) -> StoreResult<Vec<NearbyRestaurant>> {
        let pivot = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| {
                StoreError::NotFound(id.to_string(), Self::collection().to_string())
            })?;

        log::debug!(
            "proximity search around {id} ({}, {}) capped at {MAX_NEAR_DISTANCE_M} m",
            pivot.longitude,
            pivot.latitude
        );

        let near = GeoNear {
            key: POSITION_FIELD.to_string(),
            spherical: true,
            center: GeoPoint::new(pivot.longitude, pivot.latitude),
            max_distance_m: MAX_NEAR_DISTANCE_M,
            filter: Some(Filter::eq("country", pivot.country)),
            distance_field: DISTANCE_FIELD.to_string(),
            distance_multiplier: METERS_TO_KM,
        };

        self.backend
            .geo_near(near, Self::collection())
            .await?
            .into_iter()
            .map(|doc| NearbyRestaurant::from_annotated(doc, DISTANCE_FIELD))
            .collect()
    }

    // --- Bookmark counter -------------------------------------------------

    /// Atomically increments the restaurant's bookmark counter by 1 within
    /// the caller's session and returns the post-update record.
    ///
    /// Fails with [`StoreError::NotFound`] when the id does not exist.
    pub async fn bookmark(
        &self,
        id: Uuid,
        session: &mut B::Session,
    ) -> StoreResult<Restaurant> {
        self.adjust_bookmark_count(id, 1, session).await
    }

    /// Atomically decrements the restaurant's bookmark counter by 1 within
    /// the caller's session and returns the post-update record.
    ///
    /// The counter is not floored at zero: a decrement without a matching
    /// bookmark drives it negative. Callers own that invariant.
    pub async fn unbookmark(
        &self,
        id: Uuid,
        session: &mut B::Session,
    ) -> StoreResult<Restaurant> {
        self.adjust_bookmark_count(id, -1, session).await
    }

    async fn adjust_bookmark_count(
        &self,
        id: Uuid,
        delta: i64,
        session: &mut B::Session,
    ) -> StoreResult<Restaurant> {
        let updated = self
            .backend
            .find_one_and_update(
                Filter::eq(ID_FIELD, id),
                Update::inc(BOOKMARK_COUNT_FIELD, delta),
                Some(session),
                Self::collection(),
            )
            .await?
            .ok_or_else(|| {
                StoreError::NotFound(id.to_string(), Self::collection().to_string())
            })?;

        Restaurant::from_bson(updated)
    }

    /// Decrements the bookmark counter by 1 for every restaurant in the id
    /// set, in one multi-document update within the caller's session.
    ///
    /// Used for bulk cleanup when the referencing user entity disappears.
    /// Ids that match nothing are skipped silently; only an acknowledgement
    /// is returned.
    pub async fn unbookmark_all(
        &self,
        ids: &[Uuid],
        session: &mut B::Session,
    ) -> StoreResult<()> {
        self.backend
            .update_many(
                Filter::is_in(ID_FIELD, ids.iter().copied()),
                Update::inc(BOOKMARK_COUNT_FIELD, -1),
                Some(session),
                Self::collection(),
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FieldOp;

    #[test]
    fn default_query_is_a_no_op_filter() {
        let query = RestaurantQuery::default();

        assert_eq!(query.min_price, 0);
        assert_eq!(query.max_price, i64::MAX);

        let Expr::And(parts) = query.to_expr() else {
            panic!("composite filter must be a conjunction");
        };
        assert_eq!(parts.len(), 8);
    }

    #[test]
    fn price_bounds_use_range_operators() {
        let query = RestaurantQuery {
            min_price: 10,
            max_price: 60,
            ..RestaurantQuery::default()
        };

        let Expr::And(parts) = query.to_expr() else {
            panic!("composite filter must be a conjunction");
        };

        let ops = parts
            .iter()
            .filter_map(|expr| match expr {
                Expr::Field { field, op, .. } if field.ends_with("Price") => {
                    Some((field.as_str(), op))
                }
                _ => None,
            })
            .collect::<Vec<_>>();

        assert!(matches!(ops[0], ("minPrice", FieldOp::Gte)));
        assert!(matches!(ops[1], ("maxPrice", FieldOp::Lte)));
    }
}
