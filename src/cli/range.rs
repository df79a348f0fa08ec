//! `FIELD COMP VALUE...` arguments: one bound on a numeric or date field.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::date_parser::parse_lenient;
use super::field_values::parse_number;
use super::param_type::ParamError;
use crate::filters::{self, Bounds, Filter};

/// Comparison operators accepted by range filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 4] = [
        ComparisonOp::Lt,
        ComparisonOp::Lte,
        ComparisonOp::Gt,
        ComparisonOp::Gte,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
        }
    }

    /// Operator spellings, in declaration order
    pub fn names() -> Vec<String> {
        Self::ALL.iter().map(|op| op.as_str().to_string()).collect()
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonOp {
    type Err = ParamError;

    /// Operators are matched exactly; `LT` is not `lt`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| ParamError::InvalidOperator {
                op: s.to_string(),
                allowed: Self::names(),
            })
    }
}

/// Range parser with an injected value hook and filter builder
pub struct Range<T> {
    parse: fn(&str) -> Result<T, ParamError>,
    builder: fn(&str, Bounds<T>) -> Filter,
}

impl<T> Range<T> {
    pub fn new(
        parse: fn(&str) -> Result<T, ParamError>,
        builder: fn(&str, Bounds<T>) -> Filter,
    ) -> Self {
        Self { parse, builder }
    }

    /// Build the filter for `field` bounded by `op` and `raw_value`
    pub fn convert(&self, field: &str, op: &str, raw_value: &str) -> Result<Filter, ParamError> {
        let op: ComparisonOp = op.parse()?;
        let value = (self.parse)(raw_value)?;
        debug!("Range on '{}': {} {}", field, op, raw_value);

        let mut bounds = Bounds::new();
        bounds.insert(op, value);
        Ok((self.builder)(field, bounds))
    }
}

impl Range<f64> {
    /// Numeric bound (`RangeFilter`)
    pub fn numeric() -> Self {
        Self::new(parse_numeric_bound, filters::range_filter)
    }
}

impl Range<DateTime<Utc>> {
    /// Date bound (`DateRangeFilter`) using lenient ISO 8601 parsing
    pub fn date() -> Self {
        Self::new(parse_date_bound, filters::date_range)
    }
}

impl<T> Clone for Range<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Range<T> {}

impl<T> fmt::Debug for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Range")
            .field("value", &std::any::type_name::<T>())
            .finish()
    }
}

fn parse_numeric_bound(raw: &str) -> Result<f64, ParamError> {
    parse_number(raw.trim()).ok_or_else(|| ParamError::InvalidValue { value: raw.to_string() })
}

fn parse_date_bound(raw: &str) -> Result<DateTime<Utc>, ParamError> {
    parse_lenient(raw).map_err(|_| ParamError::InvalidDate { value: raw.to_string() })
}
