//! Great-circle distance math for the in-memory geo-radius scan.

use bson::Bson;

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Haversine distance between two WGS84 coordinate pairs, in meters.
pub(crate) fn haversine_distance_m(lon_a: f64, lat_a: f64, lon_b: f64, lat_b: f64) -> f64 {
    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let d_phi = (lat_b - lat_a).to_radians();
    let d_lambda = (lon_b - lon_a).to_radians();

    let half_chord = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * half_chord.sqrt().asin()
}

/// Extracts a `[longitude, latitude]` pair from a GeoJSON point field.
///
/// Returns `None` for documents lacking the field or carrying a malformed
/// point, which excludes them from geo scans.
pub(crate) fn point_coordinates(document: &Bson, key: &str) -> Option<(f64, f64)> {
    let coordinates = document
        .as_document()?
        .get(key)?
        .as_document()?
        .get("coordinates")?
        .as_array()?;

    match coordinates.as_slice() {
        [longitude, latitude] => Some((longitude.as_f64()?, latitude.as_f64()?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn haversine_matches_known_distances() {
        // Seoul City Hall to Incheon City Hall, roughly 27 km.
        let meters = haversine_distance_m(126.9780, 37.5665, 126.7052, 37.4563);
        assert!((26_000.0..29_000.0).contains(&meters), "got {meters}");

        // Zero distance to itself.
        assert!(haversine_distance_m(126.9780, 37.5665, 126.9780, 37.5665) < 1e-6);
    }

    #[test]
    fn malformed_points_are_skipped() {
        let no_field = Bson::Document(doc! { "name": "x" });
        assert_eq!(point_coordinates(&no_field, "position"), None);

        let short = Bson::Document(doc! { "position": { "type": "Point", "coordinates": [1.0] } });
        assert_eq!(point_coordinates(&short, "position"), None);

        let ok = Bson::Document(doc! { "position": { "type": "Point", "coordinates": [127.0, 37.5] } });
        assert_eq!(point_coordinates(&ok, "position"), Some((127.0, 37.5)));
    }
}
