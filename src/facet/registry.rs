//! Facet registry
//!
//! Ordered by first registration. Re-registering a name replaces the
//! definition in place without moving it.

use indexmap::IndexMap;

use super::definition::FacetDefinition;

pub struct FacetRegistry<Q> {
    facets: IndexMap<String, FacetDefinition<Q>>,
}

impl<Q> Default for FacetRegistry<Q> {
    fn default() -> Self {
        Self {
            facets: IndexMap::new(),
        }
    }
}

impl<Q> FacetRegistry<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a definition by name
    pub fn register(&mut self, definition: FacetDefinition<Q>) {
        self.facets.insert(definition.name().to_string(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&FacetDefinition<Q>> {
        self.facets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facets.contains_key(name)
    }

    /// Definitions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &FacetDefinition<Q>> {
        self.facets.values()
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.facets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}
