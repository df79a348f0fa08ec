//! `FIELD VALUES...` arguments: a field name plus a whitespace or comma
//! separated list of values, turned into an "in" filter.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use super::param_type::ParamError;
use crate::filters::{self, Filter};

/// Value-list separator: any whitespace run or a single comma
const SEPARATOR_PATTERN: &str = r"\s+|,";

fn separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(SEPARATOR_PATTERN).expect("separator pattern is valid"))
}

/// Split a raw value list, trimming and dropping empty tokens
///
/// ```
/// use geosearch::cli::field_values::split_values;
///
/// assert_eq!(split_values("Rome, Paris  London"), vec!["Rome", "Paris", "London"]);
/// ```
pub fn split_values(raw: &str) -> Vec<&str> {
    separator()
        .split(raw)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Membership parser with an injected element coercion and filter builder
pub struct FieldValues<T> {
    coerce: fn(&str) -> Option<T>,
    builder: fn(&str, Vec<T>) -> Filter,
}

impl<T> FieldValues<T> {
    pub fn new(coerce: fn(&str) -> Option<T>, builder: fn(&str, Vec<T>) -> Filter) -> Self {
        Self { coerce, builder }
    }

    /// Build the filter for `field` from a raw value list
    pub fn convert(&self, field: &str, raw_values: &str) -> Result<Filter, ParamError> {
        let values = split_values(raw_values)
            .into_iter()
            .map(|token| {
                (self.coerce)(token).ok_or_else(|| ParamError::InvalidValue {
                    value: token.to_string(),
                })
            })
            .collect::<Result<Vec<T>, _>>()?;

        debug!("{} values for field '{}'", values.len(), field);
        Ok((self.builder)(field, values))
    }
}

impl FieldValues<String> {
    /// Text membership (`StringInFilter`)
    pub fn string_in() -> Self {
        Self::new(|token| Some(token.to_string()), filters::string_filter)
    }
}

impl FieldValues<f64> {
    /// Numeric membership (`NumberInFilter`)
    pub fn number_in() -> Self {
        Self::new(parse_number, filters::num_filter)
    }
}

impl<T> Clone for FieldValues<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldValues<T> {}

impl<T> std::fmt::Debug for FieldValues<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldValues")
            .field("element", &std::any::type_name::<T>())
            .finish()
    }
}

/// Finite decimal numbers only; `NaN` and `inf` are not valid filter values
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}
