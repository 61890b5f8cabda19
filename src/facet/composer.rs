//! Filter composition
//!
//! Applies facet filters to a query. A custom filter always wins over the
//! built-in rule; a facet without a value filters nothing.

use super::definition::{FacetDefinition, FacetKind};
use super::errors::FacetResult;
use super::registry::FacetRegistry;
use crate::host::{Clause, Compare, FilterValue, GroupKey, SearchQuery, TermField};

pub struct FilterComposer;

impl FilterComposer {
    /// Applies one facet's filter to `query`
    ///
    /// Mutates only the query. The built-in rules are:
    /// - taxonomy: append to the taxonomy group
    /// - meta: append to the meta group
    /// - column: set the column var to the value
    pub fn apply_filter<Q: SearchQuery>(
        query: &mut Q,
        definition: &FacetDefinition<Q>,
    ) -> FacetResult<()> {
        if let Some(filter) = definition.custom_filter() {
            filter(query, definition);
            return Ok(());
        }

        let Some(value) = definition.value() else {
            return Ok(());
        };

        match definition.kind()? {
            FacetKind::Taxonomy => {
                let clause = Clause::Taxonomy {
                    taxonomy: definition.name().to_string(),
                    field: TermField::TermId,
                    terms: Box::new(value.clone()),
                };
                append_to_group(query, GroupKey::Taxonomy, value, clause);
            }
            FacetKind::Meta => {
                let clause = Clause::meta(definition.name(), Compare::Eq, value.clone());
                append_to_group(query, GroupKey::Meta, value, clause);
            }
            FacetKind::Column => query.set_var(definition.name(), value.clone()),
        }
        Ok(())
    }

    /// Applies every registered facet except `excluded`, in registration
    /// order
    pub fn apply_all_except<Q: SearchQuery>(
        query: &mut Q,
        registry: &FacetRegistry<Q>,
        excluded: &str,
    ) -> FacetResult<()> {
        for definition in registry.iter().filter(|d| d.name() != excluded) {
            Self::apply_filter(query, definition)?;
        }
        Ok(())
    }

    /// Applies every registered facet, in registration order
    pub fn apply_all<Q: SearchQuery>(
        query: &mut Q,
        registry: &FacetRegistry<Q>,
    ) -> FacetResult<()> {
        for definition in registry.iter() {
            Self::apply_filter(query, definition)?;
        }
        Ok(())
    }
}

/// A structured value goes in verbatim, followed by the facet's own clause
fn append_to_group<Q: SearchQuery>(
    query: &mut Q,
    key: GroupKey,
    value: &FilterValue,
    clause: Clause,
) {
    let mut group = query.filter_group(key).cloned().unwrap_or_default();
    if let Some(fragment) = value.as_fragment() {
        group.push(fragment.clone());
    }
    group.push_clause(clause);
    query.set_filter_group(key, group);
}
