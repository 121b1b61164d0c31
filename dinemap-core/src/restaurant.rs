//! The restaurant entity and its creation/result shapes.
//!
//! `Restaurant` is the sole entity of the directory. Field names serialize in
//! camelCase to match the documents the store holds. The identity is assigned
//! once at creation and is the only lookup key for point reads and the
//! proximity pivot; `bookmark_count` is the only field ever mutated after
//! creation.

use bson::{Bson, Uuid};
use serde::{Deserialize, Serialize};

use crate::{
    document::{Document, DocumentExt},
    error::{StoreError, StoreResult},
    geo::GeoPoint,
};

/// A restaurant record as stored in the directory.
///
/// A record missing `bookmarkCount` in the store always reads as 0 here; the
/// stored field itself is normalized by the bookmark-count backfill
/// migration. `position` is derived from `longitude`/`latitude` at creation;
/// records lacking it never appear in geo results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    /// Free-text area name, not a coordinate.
    pub location: String,
    pub min_price: i64,
    pub max_price: i64,
    pub currency: String,
    pub cuisine: String,
    pub longitude: f64,
    pub latitude: f64,
    pub phone_number: String,
    pub url: String,
    pub website_url: String,
    /// Empty string when the restaurant holds no award.
    pub award: String,
    pub country: String,
    #[serde(default)]
    pub bookmark_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<GeoPoint>,
}

impl Document for Restaurant {
    fn id(&self) -> &Uuid {
        &self.id
    }

    fn collection_name() -> &'static str {
        "restaurants"
    }
}

/// The full attribute set required to create a restaurant.
///
/// Identity, the bookmark counter, and the geo position are assigned by the
/// directory; everything else is caller-supplied. Field-level validation
/// (price ordering, coordinate ranges) belongs to the schema layer above.
#[derive(Debug, Clone, Default)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
    pub location: String,
    pub min_price: i64,
    pub max_price: i64,
    pub currency: String,
    pub cuisine: String,
    pub longitude: f64,
    pub latitude: f64,
    pub phone_number: String,
    pub url: String,
    pub website_url: String,
    pub award: String,
    pub country: String,
}

impl Restaurant {
    /// Materializes a new record from its attribute set, assigning the given
    /// identity and deriving the GeoJSON position from the coordinates.
    pub fn assign(id: Uuid, attrs: NewRestaurant) -> Self {
        let position = GeoPoint::new(attrs.longitude, attrs.latitude);

        Self {
            id,
            name: attrs.name,
            address: attrs.address,
            location: attrs.location,
            min_price: attrs.min_price,
            max_price: attrs.max_price,
            currency: attrs.currency,
            cuisine: attrs.cuisine,
            longitude: attrs.longitude,
            latitude: attrs.latitude,
            phone_number: attrs.phone_number,
            url: attrs.url,
            website_url: attrs.website_url,
            award: attrs.award,
            country: attrs.country,
            bookmark_count: 0,
            position: Some(position),
        }
    }
}

/// A proximity-search match: the restaurant plus its distance from the pivot.
///
/// `distance` is in kilometers, computed and annotated onto the store
/// document by the geo-radius primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyRestaurant {
    pub restaurant: Restaurant,
    pub distance: f64,
}

impl NearbyRestaurant {
    /// Splits a distance-annotated store document into the restaurant record
    /// and its computed distance.
    pub fn from_annotated(document: Bson, distance_field: &str) -> StoreResult<Self> {
        let mut fields = document
            .as_document()
            .cloned()
            .ok_or_else(|| StoreError::Serialization("expected a BSON document".to_string()))?;

        let distance = fields
            .remove(distance_field)
            .and_then(|value| value.as_f64())
            .ok_or_else(|| {
                StoreError::Serialization(format!(
                    "geo result is missing the '{distance_field}' annotation"
                ))
            })?;

        Ok(Self {
            restaurant: Restaurant::from_bson(Bson::Document(fields))?,
            distance,
        })
    }
}
