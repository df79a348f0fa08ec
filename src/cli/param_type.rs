//! Custom parameter types
//!
//! Every search option converts its raw tokens through one [`ParamType`].
//! Conversions are pure apart from at most one stdin or file read, and a
//! failed conversion never yields a partial filter.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use super::blob::{FilterJson, GeomFilter};
use super::field_values::FieldValues;
use super::input::InputError;
use super::range::Range;
use super::vocabulary::LenientChoice;
use crate::filters::Filter;

/// Conversion failures, worded for the person at the terminal
#[derive(Debug, Error)]
pub enum ParamError {
    #[error("invalid {param} choice: {value}.\nChoose from:\n\t{}", .choices.join("\n\t"))]
    InvalidChoice {
        param: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("invalid value: {value}")]
    InvalidValue { value: String },

    #[error("invalid operator: {op}. allowed: {}", .allowed.join(","))]
    InvalidOperator { op: String, allowed: Vec<String> },

    #[error("invalid date: {value}.")]
    InvalidDate { value: String },

    #[error("invalid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("invalid GeoJSON: {reason}")]
    InvalidGeoJson { reason: String },

    #[error("unable to find geometry in input")]
    NoGeometryFound,

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{metavar} takes {expected} value(s), got {actual}")]
    Arity {
        metavar: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Converted value of a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Vocabulary entries selected by an item-type or asset-type argument
    Choices(Vec<String>),
    Filter(Filter),
    /// Zero or more filters, e.g. nothing from an empty GEOM input
    Filters(Vec<Filter>),
    /// Raw filter JSON, untouched
    Json(Value),
}

impl ParamValue {
    /// Filter JSON contributed by this value; vocabulary choices contribute none.
    ///
    /// Raw JSON holding a list contributes each element, and a saved search
    /// request contributes its `filter` member.
    pub fn into_filter_values(self) -> Vec<Value> {
        match self {
            ParamValue::Choices(_) => Vec::new(),
            ParamValue::Filter(filter) => vec![filter.to_value()],
            ParamValue::Filters(filters) => filters.iter().map(Filter::to_value).collect(),
            ParamValue::Json(value) => raw_filter_values(value),
        }
    }
}

fn raw_filter_values(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut request) if request.contains_key("filter") => {
            request.remove("filter").map(raw_filter_values).unwrap_or_default()
        }
        other => vec![other],
    }
}

/// The custom parameter types of the search CLI
#[derive(Debug, Clone, Copy)]
pub enum ParamType {
    ItemType(LenientChoice),
    AssetType(LenientChoice),
    StringIn(FieldValues<String>),
    NumberIn(FieldValues<f64>),
    Range(Range<f64>),
    DateRange(Range<DateTime<Utc>>),
    Geom(GeomFilter),
    Filter(FilterJson),
}

impl ParamType {
    pub fn item_type() -> Self {
        ParamType::ItemType(LenientChoice::item_type())
    }

    pub fn asset_type() -> Self {
        ParamType::AssetType(LenientChoice::asset_type())
    }

    pub fn string_in() -> Self {
        ParamType::StringIn(FieldValues::string_in())
    }

    pub fn number_in() -> Self {
        ParamType::NumberIn(FieldValues::number_in())
    }

    pub fn range() -> Self {
        ParamType::Range(Range::numeric())
    }

    pub fn date_range() -> Self {
        ParamType::DateRange(Range::date())
    }

    pub fn geom() -> Self {
        ParamType::Geom(GeomFilter)
    }

    pub fn filter() -> Self {
        ParamType::Filter(FilterJson)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParamType::ItemType(choice) | ParamType::AssetType(choice) => choice.name(),
            ParamType::StringIn(_) | ParamType::NumberIn(_) => "field values",
            ParamType::Range(_) | ParamType::DateRange(_) => "field comp value",
            ParamType::Geom(_) => "geom",
            ParamType::Filter(_) => "filter",
        }
    }

    pub fn metavar(&self) -> &'static str {
        match self {
            ParamType::ItemType(_) => "ITEM-TYPE",
            ParamType::AssetType(_) => "ASSET-TYPE",
            ParamType::StringIn(_) | ParamType::NumberIn(_) => "FIELD VALUES...",
            ParamType::Range(_) | ParamType::DateRange(_) => "FIELD COMP VALUE...",
            ParamType::Geom(_) => "GEOM",
            ParamType::Filter(_) => "FILTER",
        }
    }

    /// Number of command-line tokens the parameter consumes
    pub fn arity(&self) -> usize {
        match self {
            ParamType::StringIn(_) | ParamType::NumberIn(_) => 2,
            ParamType::Range(_) | ParamType::DateRange(_) => 3,
            _ => 1,
        }
    }

    /// Convert one occurrence of the parameter
    pub fn convert<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ParamValue, ParamError> {
        if tokens.len() != self.arity() {
            return Err(ParamError::Arity {
                metavar: self.metavar(),
                expected: self.arity(),
                actual: tokens.len(),
            });
        }
        let token = |i: usize| tokens[i].as_ref();

        match self {
            ParamType::ItemType(choice) | ParamType::AssetType(choice) => {
                choice.convert(token(0)).map(ParamValue::Choices)
            }
            ParamType::StringIn(parser) => parser.convert(token(0), token(1)).map(ParamValue::Filter),
            ParamType::NumberIn(parser) => parser.convert(token(0), token(1)).map(ParamValue::Filter),
            ParamType::Range(parser) => {
                parser.convert(token(0), token(1), token(2)).map(ParamValue::Filter)
            }
            ParamType::DateRange(parser) => {
                parser.convert(token(0), token(1), token(2)).map(ParamValue::Filter)
            }
            ParamType::Geom(resolver) => resolver.convert(token(0)).map(ParamValue::Filters),
            ParamType::Filter(resolver) => resolver.convert(token(0)).map(ParamValue::Json),
        }
    }
}

/// Help text for each metavar, as `(metavar, description)` pairs
pub fn metavar_docs() -> &'static [(&'static str, &'static str)] {
    &[
        (
            "FIELD COMP VALUE...",
            "A comparison query where FIELD is a property of the item-type, COMP is one of \
             lt, lte, gt, gte and VALUE is the number or date to compare against. ISO 8601 \
             variants are supported: `2017` is short for `2017-01-01T00:00:00+00:00`.",
        ),
        (
            "FIELD VALUES...",
            "An 'in' query where FIELD is a property of the item-type and VALUES is space \
             or comma separated text or numbers.",
        ),
        (
            "GEOM",
            "A geometry in GeoJSON format, given inline, on stdin or in a file. `@-` reads \
             stdin and `@filename` reads the file named 'filename'. Otherwise the value is \
             taken to be GeoJSON.",
        ),
        (
            "FILTER",
            "A Data API search filter provided as JSON. `@-` reads stdin and `@filename` \
             reads the file named 'filename'. Otherwise the value is taken to be JSON.",
        ),
        (
            "ITEM-TYPE",
            "Item-Type(s) of interest. Case-insensitive and supports glob matching: \
             `psscene*` means `PSScene3Band` and `PSScene4Band`. Prefixes also match, and \
             `all` selects every Item-Type.",
        ),
        (
            "ASSET-TYPE",
            "Asset-Type(s) of interest. Case-insensitive and supports glob matching: \
             `visual*` means `visual` and `visual_xml`.",
        ),
    ]
}
