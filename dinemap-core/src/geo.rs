//! Geospatial types for the proximity search.
//!
//! Restaurants carry a derived GeoJSON point so the store's geo-radius
//! primitive has an indexable field to work from. [`GeoNear`] describes one
//! spherical radius query: center, cap, an optional equality filter on the
//! candidates, and how the computed distance is reported back.

use bson::Bson;
use serde::{Deserialize, Serialize};

use crate::query::Expr;

/// A GeoJSON point: `{ "type": "Point", "coordinates": [longitude, latitude] }`.
///
/// Coordinates are WGS84 degrees, longitude first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    /// Creates a point from a longitude/latitude pair.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// A spherical geo-radius query against one collection.
///
/// Matches are implicitly ordered nearest-first and each result document is
/// annotated with the computed distance under [`GeoNear::distance_field`],
/// multiplied by [`GeoNear::distance_multiplier`] (the store computes meters;
/// a multiplier of `0.001` reports kilometers).
#[derive(Debug, Clone)]
pub struct GeoNear {
    /// Document field holding the GeoJSON point to measure against.
    pub key: String,
    /// Use spherical geometry (great-circle distances).
    pub spherical: bool,
    /// Center of the radius query.
    pub center: GeoPoint,
    /// Maximum distance from the center, in meters.
    pub max_distance_m: f64,
    /// Additional filter candidates must satisfy (e.g. same country).
    pub filter: Option<Expr>,
    /// Name of the output field carrying the computed distance.
    pub distance_field: String,
    /// Factor applied to the store-native distance (meters) before reporting.
    pub distance_multiplier: f64,
}

impl From<GeoPoint> for Bson {
    fn from(point: GeoPoint) -> Self {
        Bson::Document(bson::doc! {
            "type": point.kind,
            "coordinates": [point.coordinates[0], point.coordinates[1]],
        })
    }
}
