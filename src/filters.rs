//! Search Filters
//!
//! Builders for the filter fragments understood by the imagery Data API.
//! A fragment serialises as `{"type": ..., "field_name": ..., "config": ...}`;
//! logical filters nest other fragments in their `config`.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::cli::range::ComparisonOp;

/// Single-key (or multi-key) mapping from comparison operator to bound
pub type Bounds<T> = BTreeMap<ComparisonOp, T>;

/// Field name used by geometry filters when none is given
pub const DEFAULT_GEOMETRY_FIELD: &str = "geometry";

/// Filter fragment kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    AndFilter,
    OrFilter,
    NotFilter,
    StringInFilter,
    NumberInFilter,
    RangeFilter,
    DateRangeFilter,
    GeometryFilter,
    PermissionFilter,
}

/// A structured query condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "type")]
    pub kind: FilterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    pub config: Value,
}

impl Filter {
    fn new(kind: FilterKind, field_name: Option<&str>, config: Value) -> Self {
        Self {
            kind,
            field_name: field_name.map(str::to_string),
            config,
        }
    }

    /// JSON form of this fragment
    pub fn to_value(&self) -> Value {
        // Derived Serialize on plain data cannot fail
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Membership filter over string values
pub fn string_filter(field_name: &str, values: Vec<String>) -> Filter {
    Filter::new(FilterKind::StringInFilter, Some(field_name), json!(values))
}

/// Membership filter over numeric values
pub fn num_filter(field_name: &str, values: Vec<f64>) -> Filter {
    Filter::new(FilterKind::NumberInFilter, Some(field_name), json!(values))
}

/// Numeric range filter
pub fn range_filter(field_name: &str, bounds: Bounds<f64>) -> Filter {
    let config = bounds
        .into_iter()
        .map(|(op, value)| (op.as_str().to_string(), json!(value)))
        .collect::<Map<_, _>>();
    Filter::new(FilterKind::RangeFilter, Some(field_name), Value::Object(config))
}

/// Date range filter; bounds are rendered as RFC 3339 UTC instants
pub fn date_range(field_name: &str, bounds: Bounds<DateTime<Utc>>) -> Filter {
    let config = bounds
        .into_iter()
        .map(|(op, instant)| (op.as_str().to_string(), Value::String(format_instant(&instant))))
        .collect::<Map<_, _>>();
    Filter::new(FilterKind::DateRangeFilter, Some(field_name), Value::Object(config))
}

/// Spatial intersection filter
pub fn geom_filter(geometry: Value, field_name: Option<&str>) -> Filter {
    Filter::new(
        FilterKind::GeometryFilter,
        Some(field_name.unwrap_or(DEFAULT_GEOMETRY_FIELD)),
        geometry,
    )
}

/// Every predicate must hold
pub fn and_filter(predicates: Vec<Value>) -> Filter {
    Filter::new(FilterKind::AndFilter, None, Value::Array(predicates))
}

/// At least one predicate must hold
pub fn or_filter(predicates: Vec<Value>) -> Filter {
    Filter::new(FilterKind::OrFilter, None, Value::Array(predicates))
}

pub fn not_filter(predicate: Value) -> Filter {
    Filter::new(FilterKind::NotFilter, None, predicate)
}

/// Restrict results to items carrying the given permissions
pub fn permission_filter(permissions: Vec<String>) -> Filter {
    Filter::new(FilterKind::PermissionFilter, None, json!(permissions))
}

/// Assemble a search request body.
///
/// `filter_like` may be a bare filter or a previous request carrying a
/// `filter` member; item types already present on it are merged with
/// `item_types`, keeping first-seen order.
pub fn build_search_request(
    filter_like: &Value,
    item_types: &[String],
    name: Option<&str>,
    interval: Option<&str>,
) -> Value {
    let filter_spec = filter_like.get("filter").unwrap_or(filter_like).clone();

    let mut all_items: Vec<String> = filter_like
        .get("item_types")
        .and_then(Value::as_array)
        .map(|existing| {
            existing
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    for item_type in item_types {
        if !all_items.contains(item_type) {
            all_items.push(item_type.clone());
        }
    }

    let mut request = Map::new();
    request.insert("item_types".to_string(), json!(all_items));
    request.insert("filter".to_string(), filter_spec);
    if let Some(name) = name {
        request.insert("name".to_string(), Value::String(name.to_string()));
    }
    if let Some(interval) = interval {
        request.insert("interval".to_string(), Value::String(interval.to_string()));
    }
    Value::Object(request)
}

fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
