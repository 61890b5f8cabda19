//! Facet configuration
//!
//! Facet sets can be declared as JSON:
//!
//! ```json
//! {
//!   "facets": [
//!     {"name": "post_status", "kind": "column"},
//!     {"name": "rating", "kind": "meta", "value": "3"},
//!     {"name": "category", "kind": "taxonomy", "value": [4, 7]}
//!   ]
//! }
//! ```
//!
//! Kinds are kept as declared. An unknown kind is reported when the facets
//! are computed, not when the file is loaded.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::definition::FacetDefinition;
use super::errors::{FacetError, FacetResult};
use crate::host::FilterValue;
use crate::observability::{log_event_with_fields, Event};

/// One declared facet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetSpec {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub value: Option<FilterValue>,
}

impl FacetSpec {
    pub fn into_definition<Q>(self) -> FacetDefinition<Q> {
        FacetDefinition::declared(self.name, &self.kind).with_optional_value(self.value)
    }
}

/// A declared facet set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetConfig {
    #[serde(default)]
    pub facets: Vec<FacetSpec>,
}

impl FacetConfig {
    pub fn from_json_str(json: &str) -> FacetResult<Self> {
        serde_json::from_str(json).map_err(|e| FacetError::Config(e.to_string()))
    }

    /// Loads a facet set from a JSON file
    pub fn load(path: impl AsRef<Path>) -> FacetResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| FacetError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&raw)?;

        let count = config.facets.len().to_string();
        let display = path.display().to_string();
        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", display.as_str()), ("facets", count.as_str())],
        );
        Ok(config)
    }
}
