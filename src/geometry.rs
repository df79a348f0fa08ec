//! GeoJSON geometry extraction

use serde_json::Value;

/// Best-effort geometry lookup in GeoJSON-shaped input.
///
/// Accepts a bare geometry, a `Feature`, or a `FeatureCollection` (whose first
/// feature is used). Returns `None` when nothing geometry-like is found.
pub fn geometry_from_json(value: &Value) -> Option<Value> {
    let mut object = value.as_object()?;
    let mut kind = object.get("type")?.as_str()?;

    if kind == "FeatureCollection" {
        object = object
            .get("features")?
            .as_array()?
            .first()?
            .as_object()?;
        kind = object.get("type")?.as_str()?;
    }

    let geometry = if kind == "Feature" {
        object.get("geometry")?.as_object()?
    } else {
        object
    };

    let is_collection = geometry.get("type").and_then(Value::as_str) == Some("GeometryCollection")
        && geometry.get("geometries").is_some_and(Value::is_array);

    if geometry.contains_key("coordinates") || is_collection {
        Some(Value::Object(geometry.clone()))
    } else {
        None
    }
}
