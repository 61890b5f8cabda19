//! Clause rewriting
//!
//! Turns the clause bundle of a content query into one that yields
//! grouped `(value, label, count)` rows for a single facet. Limit and
//! ordering are always cleared: they would truncate or reorder the value
//! set.

use super::definition::FacetKind;
use crate::host::{ClauseBundle, Storage};

pub struct ClauseRewriter<'a> {
    storage: &'a dyn Storage,
}

impl<'a> ClauseRewriter<'a> {
    pub fn new(storage: &'a dyn Storage) -> Self {
        Self { storage }
    }

    /// Rewrites `clauses` to count the values of `facet`
    pub fn rewrite(&self, clauses: &mut ClauseBundle, facet: &str, kind: FacetKind) {
        let tables = self.storage.tables();
        let posts = tables.posts();
        let name = self.storage.escape_literal(facet);
        let count = format!("COUNT(DISTINCT {}.ID) AS count", posts);

        match kind {
            FacetKind::Taxonomy => {
                clauses.join.push_str(&format!(
                    " INNER JOIN {} AS qf_tr ON qf_tr.object_id = {}.ID",
                    tables.term_relationships(),
                    posts
                ));
                clauses.join.push_str(&format!(
                    " INNER JOIN {} AS qf_tt ON qf_tt.term_taxonomy_id = qf_tr.term_taxonomy_id",
                    tables.term_taxonomy()
                ));
                clauses.join.push_str(&format!(
                    " INNER JOIN {} AS qf_t ON qf_t.term_id = qf_tt.term_id",
                    tables.terms()
                ));
                clauses
                    .where_clause
                    .push_str(&format!(" AND qf_tt.taxonomy = '{}'", name));
                clauses.fields = format!("qf_t.slug AS value, qf_t.name AS label, {}", count);
                clauses.groupby = "qf_t.slug".to_string();
            }
            FacetKind::Meta => {
                clauses.join.push_str(&format!(
                    " INNER JOIN {} AS qf_meta ON qf_meta.post_id = {}.ID \
                     AND qf_meta.meta_key = '{}'",
                    tables.postmeta(),
                    posts,
                    name
                ));
                clauses.fields = format!("qf_meta.meta_value AS value, {}", count);
                clauses.groupby = "qf_meta.meta_value".to_string();
            }
            FacetKind::Column => {
                let column = format!("{}.{}", posts, name);
                clauses.fields = format!("{} AS value, {}", column, count);
                clauses.groupby = column;
            }
        }

        clauses.limits.clear();
        clauses.orderby.clear();
    }
}
