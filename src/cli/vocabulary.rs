//! Lenient vocabulary matching for item-type and asset-type arguments
//!
//! Unlike a plain choice argument, a match always yields a list so that
//! `all`, globs and prefixes can select several entries at once.

use log::trace;
use regex::Regex;

use super::param_type::ParamError;

/// Imagery item types accepted by the Data API
pub const ITEM_TYPES: &[&str] = &[
    "PSScene4Band",
    "PSScene3Band",
    "REScene",
    "REOrthoTile",
    "Sentinel2L1C",
    "PSOrthoTile",
    "Landsat8L1G",
];

/// Per-item asset types
pub const ASSET_TYPES: &[&str] = &[
    "analytic", "analytic_b1", "analytic_b10", "analytic_b11", "analytic_b12",
    "analytic_b2", "analytic_b3", "analytic_b4", "analytic_b5", "analytic_b6",
    "analytic_b7", "analytic_b8", "analytic_b8a", "analytic_b9",
    "analytic_bqa", "analytic_dn", "analytic_dn_xml", "analytic_ms",
    "analytic_xml", "basic_analytic", "basic_analytic_b1",
    "basic_analytic_b1_nitf", "basic_analytic_b2", "basic_analytic_b2_nitf",
    "basic_analytic_b3", "basic_analytic_b3_nitf", "basic_analytic_b4",
    "basic_analytic_b4_nitf", "basic_analytic_b5", "basic_analytic_b5_nitf",
    "basic_analytic_dn", "basic_analytic_dn_nitf", "basic_analytic_dn_rpc",
    "basic_analytic_dn_rpc_nitf", "basic_analytic_dn_xml",
    "basic_analytic_dn_xml_nitf", "basic_analytic_nitf", "basic_analytic_rpc",
    "basic_analytic_rpc_nitf", "basic_analytic_sci", "basic_analytic_xml",
    "basic_analytic_xml_nitf", "basic_udm", "browse", "metadata_aux",
    "metadata_txt", "udm", "visual", "visual_xml",
];

/// Keyword selecting the whole vocabulary
const ALL_KEYWORD: &str = "all";

/// Glob wildcard
const WILDCARD: char = '*';

/// Case-insensitive matcher over a fixed vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LenientChoice {
    name: &'static str,
    choices: &'static [&'static str],
    allow_all: bool,
    allow_prefix: bool,
}

impl LenientChoice {
    pub const fn new(
        name: &'static str,
        choices: &'static [&'static str],
        allow_all: bool,
        allow_prefix: bool,
    ) -> Self {
        Self { name, choices, allow_all, allow_prefix }
    }

    /// Item types: `all` and prefix matching enabled
    pub const fn item_type() -> Self {
        Self::new("item-type", ITEM_TYPES, true, true)
    }

    /// Asset types: exact names and globs only
    pub const fn asset_type() -> Self {
        Self::new("asset-type", ASSET_TYPES, false, false)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn choices(&self) -> &'static [&'static str] {
        self.choices
    }

    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    pub fn allows_prefix(&self) -> bool {
        self.allow_prefix
    }

    /// Resolve a user value to the vocabulary entries it selects
    pub fn convert(&self, value: &str) -> Result<Vec<String>, ParamError> {
        let lowered = value.to_lowercase();

        let matches: Vec<String> = if self.allow_all && lowered == ALL_KEYWORD {
            self.choices.iter().map(|c| c.to_string()).collect()
        } else if lowered.contains(WILDCARD) {
            let pattern = glob_to_regex(&lowered).map_err(|_| self.invalid(value))?;
            self.collect(|choice| pattern.is_match(choice))
        } else if self.allow_prefix {
            self.collect(|choice| choice.starts_with(&lowered))
        } else {
            self.collect(|choice| choice == lowered)
        };

        trace!("{} '{}' matched {:?}", self.name, value, matches);

        if matches.is_empty() {
            Err(self.invalid(value))
        } else {
            Ok(matches)
        }
    }

    /// Resolve several values, returning their union in vocabulary order
    pub fn convert_all<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<String>, ParamError> {
        let mut selected = Vec::new();
        for value in values {
            selected.extend(self.convert(value.as_ref())?);
        }
        Ok(self
            .choices
            .iter()
            .filter(|choice| selected.iter().any(|s| s == *choice))
            .map(|choice| choice.to_string())
            .collect())
    }

    fn collect<F>(&self, predicate: F) -> Vec<String>
    where
        F: Fn(&str) -> bool,
    {
        self.choices
            .iter()
            .filter(|choice| predicate(&choice.to_lowercase()))
            .map(|choice| choice.to_string())
            .collect()
    }

    fn invalid(&self, value: &str) -> ParamError {
        ParamError::InvalidChoice {
            param: self.name.to_string(),
            value: value.to_string(),
            choices: self.choices.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Translate a glob into a regex anchored at the start of the candidate
fn glob_to_regex(glob: &str) -> Result<Regex, regex::Error> {
    let body = glob
        .split(WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{}", body))
}
