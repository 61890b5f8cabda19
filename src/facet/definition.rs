//! Facet definitions

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::errors::{FacetError, FacetResult};
use crate::host::FilterValue;

/// What a facet counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    /// Terms of a taxonomy
    Taxonomy,
    /// Values of a meta key
    Meta,
    /// Values of a content column
    Column,
}

impl FacetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKind::Taxonomy => "taxonomy",
            FacetKind::Meta => "meta",
            FacetKind::Column => "column",
        }
    }

    /// Parses a declared kind name
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "taxonomy" => Some(FacetKind::Taxonomy),
            "meta" => Some(FacetKind::Meta),
            "column" => Some(FacetKind::Column),
            _ => None,
        }
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied filter replacing the built-in one
pub type CustomFilter<Q> = Rc<dyn Fn(&mut Q, &FacetDefinition<Q>)>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeclaredKind {
    Known(FacetKind),
    Unknown(String),
}

/// One facet to compute
///
/// The kind is fixed at construction. A definition declared with an
/// unrecognized kind name can be registered, but resolving its kind fails
/// with [`FacetError::UnknownFacetKind`].
pub struct FacetDefinition<Q> {
    name: String,
    kind: DeclaredKind,
    value: Option<FilterValue>,
    custom_filter: Option<CustomFilter<Q>>,
}

impl<Q> FacetDefinition<Q> {
    pub fn new(name: impl Into<String>, kind: FacetKind) -> Self {
        Self {
            name: name.into(),
            kind: DeclaredKind::Known(kind),
            value: None,
            custom_filter: None,
        }
    }

    /// Definition whose kind is given by name
    pub fn declared(name: impl Into<String>, kind: &str) -> Self {
        let kind = match FacetKind::parse(kind) {
            Some(kind) => DeclaredKind::Known(kind),
            None => DeclaredKind::Unknown(kind.to_string()),
        };
        Self {
            name: name.into(),
            kind,
            value: None,
            custom_filter: None,
        }
    }

    /// Sets the active filter value
    pub fn with_value(mut self, value: impl Into<FilterValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets an optional filter value
    pub fn with_optional_value(mut self, value: Option<FilterValue>) -> Self {
        self.value = value;
        self
    }

    /// Replaces the built-in filter; the value is then ignored
    pub fn with_custom_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&mut Q, &FacetDefinition<Q>) + 'static,
    {
        self.custom_filter = Some(Rc::new(filter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves the kind
    pub fn kind(&self) -> FacetResult<FacetKind> {
        match &self.kind {
            DeclaredKind::Known(kind) => Ok(*kind),
            DeclaredKind::Unknown(kind) => Err(FacetError::unknown_kind(&self.name, kind)),
        }
    }

    /// Kind name as declared
    pub fn declared_kind(&self) -> &str {
        match &self.kind {
            DeclaredKind::Known(kind) => kind.as_str(),
            DeclaredKind::Unknown(kind) => kind,
        }
    }

    pub fn value(&self) -> Option<&FilterValue> {
        self.value.as_ref()
    }

    pub fn custom_filter(&self) -> Option<&CustomFilter<Q>> {
        self.custom_filter.as_ref()
    }
}

impl<Q> Clone for FacetDefinition<Q> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            value: self.value.clone(),
            custom_filter: self.custom_filter.clone(),
        }
    }
}

impl<Q> fmt::Debug for FacetDefinition<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FacetDefinition")
            .field("name", &self.name)
            .field("kind", &self.declared_kind())
            .field("value", &self.value)
            .field("custom_filter", &self.custom_filter.is_some())
            .finish()
    }
}
