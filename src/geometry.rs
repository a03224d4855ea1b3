//! Coordinate parsing and GeoJSON encoding for building geometry.
//!
//! The API accepts coordinates as a `"lat, lon"` string and serves geometry
//! back as GeoJSON, where point coordinates are `[lon, lat]`. The stored
//! point is fixed to SRID 21037 (`model::entities::building::SRID`).

use geo_types::Point;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use model::entities::building;
use serde_json::json;

use crate::error::ApiError;

pub const COORDINATE_FORMAT_ERROR: &str =
    "Coordinate format cannot be parsed. The coordinate should be two floats values separated by a comma.";

/// Parse a `"lat, lon"` pair. The returned point is x = longitude,
/// y = latitude.
pub fn parse_coordinate(raw: &str) -> Result<Point<f64>, ApiError> {
    let compact = raw.replace(' ', "");
    let parts: Vec<&str> = compact.split(',').collect();
    if parts.len() != 2 {
        return Err(ApiError::bad_request(COORDINATE_FORMAT_ERROR));
    }
    let lat: f64 = parts[0]
        .parse()
        .map_err(|_| ApiError::bad_request(COORDINATE_FORMAT_ERROR))?;
    let lon: f64 = parts[1]
        .parse()
        .map_err(|_| ApiError::bad_request(COORDINATE_FORMAT_ERROR))?;
    Ok(Point::new(lon, lat))
}

/// GeoJSON point geometry for a stored building.
pub fn point_geometry(longitude: f64, latitude: f64) -> Geometry {
    Geometry::new(Value::Point(vec![longitude, latitude]))
}

/// Bulk-geometry output: every building as a GeoJSON feature with its
/// letting attributes as properties.
pub fn feature_collection(buildings: &[building::Model]) -> FeatureCollection {
    let features = buildings
        .iter()
        .map(|b| {
            let mut properties = JsonObject::new();
            properties.insert("pk".to_string(), json!(b.id));
            properties.insert("rent".to_string(), json!(b.rent));
            properties.insert("payment_details".to_string(), json!(b.payment_details));
            properties.insert("county".to_string(), json!(b.county));
            properties.insert("district".to_string(), json!(b.district));
            properties.insert("comment".to_string(), json!(b.comment));
            properties.insert("occupancy".to_string(), json!(b.occupancy));
            Feature {
                bbox: None,
                geometry: Some(point_geometry(b.longitude, b.latitude)),
                id: Some(Id::Number(b.id.into())),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
