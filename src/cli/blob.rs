//! `GEOM` and `FILTER` arguments: JSON supplied inline, on stdin, or in a file.

use log::debug;
use serde_json::Value;

use super::input;
use super::param_type::ParamError;
use crate::filters::{self, Filter};
use crate::geometry::geometry_from_json;

/// GeoJSON area of interest, turned into a geometry filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeomFilter;

impl GeomFilter {
    pub fn convert(&self, argument: &str) -> Result<Vec<Filter>, ParamError> {
        let content = input::read(argument)?;
        self.convert_content(&content)
    }

    /// Parse already-resolved content
    pub fn convert_content(&self, content: &str) -> Result<Vec<Filter>, ParamError> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let parsed: Value = serde_json::from_str(content).map_err(|e| ParamError::InvalidGeoJson {
            reason: e.to_string(),
        })?;
        let geometry = geometry_from_json(&parsed).ok_or(ParamError::NoGeometryFound)?;
        debug!("Geometry filter from {} input", geometry["type"]);
        Ok(vec![filters::geom_filter(geometry, None)])
    }
}

/// Raw Data API filter, passed through unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterJson;

impl FilterJson {
    pub fn convert(&self, argument: &str) -> Result<Value, ParamError> {
        let content = input::read(argument)?;
        self.convert_content(&content)
    }

    /// Parse already-resolved content; empty content contributes no filters
    pub fn convert_content(&self, content: &str) -> Result<Value, ParamError> {
        if content.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        serde_json::from_str(content).map_err(|e| ParamError::InvalidJson { reason: e.to_string() })
    }
}
