//! Reference SQL host
//!
//! A post-table query object and the pipeline that turns it into a
//! clause bundle and a statement. It renders exactly the filter shapes
//! the facet engine produces:
//!
//! - plain vars as equality (or `IN`) constraints on content columns
//! - taxonomy clauses as term subqueries
//! - meta clauses as `EXISTS` subqueries on the meta table
//! - nested groups with their relation
//!
//! plus pagination (`posts_per_page`, `paged`) and ordering
//! (`orderby`, `order`).

use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use super::errors::HostResult;
use super::filter_group::{Clause, Compare, FilterGroup, FilterNode, FilterValue, GroupKey};
use super::hooks::{CountingPass, HookRegistry};
use super::{ClauseBundle, Host, Row, SearchQuery, Storage, TableNames};
use crate::observability::{log_event_with_fields, Event};

/// Default page size
pub const DEFAULT_POSTS_PER_PAGE: i64 = 10;

/// Vars that control pagination and ordering rather than filtering
const RESERVED_VARS: [&str; 4] = ["posts_per_page", "paged", "orderby", "order"];

/// Var value meaning "no constraint on this column"
const ANY: &str = "any";

/// Escapes a string for a single- or double-quoted SQL literal
pub fn escape_sql(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Query over the content table
#[derive(Debug, Clone, PartialEq)]
pub struct PostQuery {
    vars: BTreeMap<String, FilterValue>,
    tax_query: Option<FilterGroup>,
    meta_query: Option<FilterGroup>,
    found_rows: bool,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl PostQuery {
    pub fn new() -> Self {
        Self {
            vars: BTreeMap::new(),
            tax_query: None,
            meta_query: None,
            found_rows: true,
        }
    }

    /// Sets a var
    pub fn with_var(mut self, name: &str, value: impl Into<FilterValue>) -> Self {
        self.set_var(name, value.into());
        self
    }

    /// Sets the page size; a negative size disables pagination
    pub fn with_posts_per_page(self, n: i64) -> Self {
        self.with_var("posts_per_page", n)
    }

    /// Sets the 1-based page number
    pub fn with_page(self, page: i64) -> Self {
        self.with_var("paged", page)
    }

    /// Sets the ordering column and direction
    pub fn with_order(self, column: &str, descending: bool) -> Self {
        self.with_var("orderby", column)
            .with_var("order", if descending { "DESC" } else { "ASC" })
    }

    /// Whether total-count bookkeeping is enabled
    pub fn counts_found_rows(&self) -> bool {
        self.found_rows
    }

    fn int_var(&self, name: &str) -> Option<i64> {
        match self.vars.get(name)? {
            FilterValue::Scalar(Value::Number(n)) => n.as_i64(),
            FilterValue::Scalar(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    fn str_var(&self, name: &str) -> Option<&str> {
        match self.vars.get(name)? {
            FilterValue::Scalar(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl SearchQuery for PostQuery {
    fn var(&self, name: &str) -> Option<&FilterValue> {
        self.vars.get(name)
    }

    fn set_var(&mut self, name: &str, value: FilterValue) {
        self.vars.insert(name.to_string(), value);
    }

    fn filter_group(&self, key: GroupKey) -> Option<&FilterGroup> {
        match key {
            GroupKey::Taxonomy => self.tax_query.as_ref(),
            GroupKey::Meta => self.meta_query.as_ref(),
        }
    }

    fn set_filter_group(&mut self, key: GroupKey, group: FilterGroup) {
        match key {
            GroupKey::Taxonomy => self.tax_query = Some(group),
            GroupKey::Meta => self.meta_query = Some(group),
        }
    }

    fn disable_found_rows(&mut self) {
        self.found_rows = false;
    }
}

/// SQL pipeline over a [`Storage`]
pub struct SqlHost {
    storage: Rc<dyn Storage>,
    hooks: HookRegistry,
}

impl SqlHost {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self {
            storage,
            hooks: HookRegistry::new(),
        }
    }

    /// Generates the content clauses for a query, before any hook runs
    pub fn generate_clauses(&self, query: &PostQuery) -> ClauseBundle {
        let renderer = Renderer {
            storage: self.storage.as_ref(),
            tables: self.storage.tables(),
        };
        let posts = renderer.tables.posts();

        let mut where_clause = String::new();
        for (name, value) in &query.vars {
            if RESERVED_VARS.contains(&name.as_str()) {
                continue;
            }
            if let Some(cond) = renderer.column_condition(name, value) {
                where_clause.push_str(" AND ");
                where_clause.push_str(&cond);
            }
        }
        for key in [GroupKey::Taxonomy, GroupKey::Meta] {
            if let Some(group) = query.filter_group(key) {
                if let Some(cond) = renderer.group(group) {
                    where_clause.push_str(" AND ");
                    where_clause.push_str(&cond);
                }
            }
        }

        let fields = if query.found_rows {
            format!("SQL_CALC_FOUND_ROWS {}.*", posts)
        } else {
            format!("{}.*", posts)
        };

        let orderby = format!(
            "{}.{} {}",
            posts,
            self.storage.escape_literal(query.str_var("orderby").unwrap_or("post_date")),
            match query.str_var("order") {
                Some(o) if o.eq_ignore_ascii_case("ASC") => "ASC",
                _ => "DESC",
            }
        );

        let per_page = query
            .int_var("posts_per_page")
            .unwrap_or(DEFAULT_POSTS_PER_PAGE);
        let limits = if per_page < 0 {
            String::new()
        } else {
            let page = query.int_var("paged").unwrap_or(1).max(1);
            // Offsets past i64 select nothing either way
            let offset = (page - 1).checked_mul(per_page).unwrap_or(i64::MAX);
            format!("LIMIT {}, {}", offset, per_page)
        };

        ClauseBundle {
            fields,
            join: String::new(),
            where_clause,
            groupby: String::new(),
            orderby,
            limits,
        }
    }
}

impl Host for SqlHost {
    type Query = PostQuery;

    fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    fn storage(&self) -> Rc<dyn Storage> {
        Rc::clone(&self.storage)
    }

    fn execute(&self, query: &PostQuery, pass: Option<&CountingPass>) -> HostResult<Vec<Row>> {
        let mut clauses = self.generate_clauses(query);

        if let (Some(pass), Some(hook)) = (pass, self.hooks.clause_hook()) {
            hook.rewrite(&mut clauses, pass);
        }

        let mut statement = clauses.assemble(&self.storage.tables().posts());

        if let (Some(pass), Some(hook)) = (pass, self.hooks.request_hook()) {
            statement = hook.intercept(&statement, pass)?;
        }

        if statement.is_empty() {
            return Ok(Vec::new());
        }
        self.storage.run_statement(&statement)
    }
}

struct Renderer<'a> {
    storage: &'a dyn Storage,
    tables: &'a TableNames,
}

impl Renderer<'_> {
    fn literal(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(format!("'{}'", self.storage.escape_literal(s))),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            _ => None,
        }
    }

    /// `(a, b, ..)`, or `None` for an empty list or an unrenderable item
    fn literal_list(&self, items: &[Value]) -> Option<String> {
        let rendered: Option<Vec<String>> = items.iter().map(|v| self.literal(v)).collect();
        let rendered = rendered?;
        if rendered.is_empty() {
            return None;
        }
        Some(format!("({})", rendered.join(", ")))
    }

    /// `= x` for scalars, `IN (..)` for lists
    fn match_expr(&self, value: &Value) -> Option<String> {
        match value {
            Value::Array(items) => Some(format!("IN {}", self.literal_list(items)?)),
            other => Some(format!("= {}", self.literal(other)?)),
        }
    }

    /// Meta value comparison
    ///
    /// Lists only combine with `=`, `IN` (both render `IN`) and `!=`
    /// (renders `NOT IN`). A scalar under `IN` is a one-element list.
    fn meta_expr(&self, compare: Compare, value: &Value) -> Option<String> {
        match (compare, value) {
            (Compare::Eq | Compare::In, Value::Array(items)) => {
                Some(format!("IN {}", self.literal_list(items)?))
            }
            (Compare::NotEq, Value::Array(items)) => {
                Some(format!("NOT IN {}", self.literal_list(items)?))
            }
            (_, Value::Array(_)) => None,
            (Compare::In, other) => Some(format!("IN ({})", self.literal(other)?)),
            (compare, other) => Some(format!("{} {}", compare.as_sql(), self.literal(other)?)),
        }
    }

    fn column_condition(&self, name: &str, value: &FilterValue) -> Option<String> {
        let posts = self.tables.posts();
        let column = self.storage.escape_literal(name);
        match value {
            FilterValue::Scalar(Value::String(s)) if s == ANY => None,
            FilterValue::Scalar(Value::Null) => Some(format!("{}.{} IS NULL", posts, column)),
            FilterValue::Scalar(v) => match self.match_expr(v) {
                Some(expr) => Some(format!("{}.{} {}", posts, column, expr)),
                None => skipped(name, "unsupported column value"),
            },
            FilterValue::Fragment(_) => skipped(name, "structured value on a column"),
        }
    }

    fn group(&self, group: &FilterGroup) -> Option<String> {
        let parts: Vec<String> = group
            .clauses
            .iter()
            .filter_map(|node| match node {
                FilterNode::Clause(clause) => self.clause(clause),
                FilterNode::Group(inner) => self.group(inner),
            })
            .collect();
        if parts.is_empty() {
            return None;
        }
        let sep = format!(" {} ", group.relation.as_sql());
        Some(format!("({})", parts.join(&sep)))
    }

    fn clause(&self, clause: &Clause) -> Option<String> {
        let posts = self.tables.posts();
        match clause {
            Clause::Taxonomy {
                taxonomy,
                field,
                terms,
            } => {
                let FilterValue::Scalar(terms) = terms.as_ref() else {
                    return skipped(taxonomy, "structured term selector");
                };
                let Some(expr) = self.match_expr(terms) else {
                    return skipped(taxonomy, "unsupported term selector");
                };
                Some(format!(
                    "{posts}.ID IN (SELECT tr.object_id FROM {tr} AS tr \
                     INNER JOIN {tt} AS tt ON tt.term_taxonomy_id = tr.term_taxonomy_id \
                     INNER JOIN {t} AS t ON t.term_id = tt.term_id \
                     WHERE tt.taxonomy = '{taxonomy}' AND t.{column} {expr})",
                    posts = posts,
                    tr = self.tables.term_relationships(),
                    tt = self.tables.term_taxonomy(),
                    t = self.tables.terms(),
                    taxonomy = self.storage.escape_literal(taxonomy),
                    column = field.column(),
                    expr = expr,
                ))
            }
            Clause::Meta {
                key,
                compare,
                value,
            } => {
                let FilterValue::Scalar(value) = value.as_ref() else {
                    return skipped(key, "structured meta value");
                };
                let Some(expr) = self.meta_expr(*compare, value) else {
                    return skipped(key, "unsupported meta comparison");
                };
                Some(format!(
                    "EXISTS (SELECT 1 FROM {pm} AS mq WHERE mq.post_id = {posts}.ID \
                     AND mq.meta_key = '{key}' AND mq.meta_value {expr})",
                    pm = self.tables.postmeta(),
                    posts = posts,
                    key = self.storage.escape_literal(key),
                    expr = expr,
                ))
            }
        }
    }
}

fn skipped(target: &str, reason: &str) -> Option<String> {
    log_event_with_fields(Event::ClauseSkipped, &[("target", target), ("reason", reason)]);
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostError;
    use serde_json::json;

    struct NullStorage {
        tables: TableNames,
    }

    impl Storage for NullStorage {
        fn run_statement(&self, _statement: &str) -> HostResult<Vec<Row>> {
            Err(HostError::Unavailable("not connected".into()))
        }

        fn escape_literal(&self, raw: &str) -> String {
            escape_sql(raw)
        }

        fn tables(&self) -> &TableNames {
            &self.tables
        }
    }

    fn host() -> SqlHost {
        SqlHost::new(Rc::new(NullStorage {
            tables: TableNames::default(),
        }))
    }

    #[test]
    fn test_escape_sql() {
        assert_eq!(escape_sql("plain"), "plain");
        assert_eq!(escape_sql("it's"), "it\\'s");
        assert_eq!(escape_sql("a\"b"), "a\\\"b");
        assert_eq!(escape_sql("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_default_clauses() {
        let clauses = host().generate_clauses(&PostQuery::new());
        assert_eq!(clauses.fields, "SQL_CALC_FOUND_ROWS wp_posts.*");
        assert_eq!(clauses.where_clause, "");
        assert_eq!(clauses.orderby, "wp_posts.post_date DESC");
        assert_eq!(clauses.limits, "LIMIT 0, 10");
    }

    #[test]
    fn test_pagination_and_order() {
        let query = PostQuery::new()
            .with_posts_per_page(5)
            .with_page(3)
            .with_order("post_title", false);
        let clauses = host().generate_clauses(&query);
        assert_eq!(clauses.limits, "LIMIT 10, 5");
        assert_eq!(clauses.orderby, "wp_posts.post_title ASC");

        let unpaged = host().generate_clauses(&PostQuery::new().with_posts_per_page(-1));
        assert_eq!(unpaged.limits, "");
    }

    #[test]
    fn test_page_offset_saturates() {
        let query = PostQuery::new().with_page(i64::MAX);
        let clauses = host().generate_clauses(&query);
        assert_eq!(clauses.limits, format!("LIMIT {}, 10", i64::MAX));

        let huge = PostQuery::new().with_posts_per_page(i64::MAX).with_page(3);
        assert_eq!(
            host().generate_clauses(&huge).limits,
            format!("LIMIT {}, {}", i64::MAX, i64::MAX)
        );
    }

    #[test]
    fn test_disable_found_rows() {
        let mut query = PostQuery::new();
        query.disable_found_rows();
        assert_eq!(host().generate_clauses(&query).fields, "wp_posts.*");
    }

    #[test]
    fn test_column_vars() {
        let query = PostQuery::new()
            .with_var("post_status", "publish")
            .with_var("post_type", ANY)
            .with_var("post_author", FilterValue::Scalar(json!([1, 2])));
        let clauses = host().generate_clauses(&query);
        assert_eq!(
            clauses.where_clause,
            " AND wp_posts.post_author IN (1, 2) AND wp_posts.post_status = 'publish'"
        );
    }

    #[test]
    fn test_meta_group_rendering() {
        let mut group = FilterGroup::default();
        group.push_clause(Clause::meta("rating", Compare::Gte, "3"));
        let mut query = PostQuery::new();
        query.set_filter_group(GroupKey::Meta, group);

        let clauses = host().generate_clauses(&query);
        assert_eq!(
            clauses.where_clause,
            " AND (EXISTS (SELECT 1 FROM wp_postmeta AS mq WHERE mq.post_id = wp_posts.ID \
             AND mq.meta_key = 'rating' AND mq.meta_value >= '3'))"
        );
    }

    fn meta_where(clause: Clause) -> String {
        let mut group = FilterGroup::default();
        group.push_clause(clause);
        let mut query = PostQuery::new();
        query.set_filter_group(GroupKey::Meta, group);
        host().generate_clauses(&query).where_clause
    }

    #[test]
    fn test_meta_list_comparisons() {
        let colors = || FilterValue::Scalar(json!(["red", "blue"]));

        let eq = meta_where(Clause::meta("color", Compare::Eq, colors()));
        assert!(eq.ends_with("mq.meta_value IN ('red', 'blue')))"));

        let in_list = meta_where(Clause::meta("color", Compare::In, colors()));
        assert!(in_list.ends_with("mq.meta_value IN ('red', 'blue')))"));

        let not_eq = meta_where(Clause::meta("color", Compare::NotEq, colors()));
        assert!(not_eq.ends_with("mq.meta_value NOT IN ('red', 'blue')))"));
    }

    #[test]
    fn test_meta_scalar_in_is_wrapped() {
        let where_clause = meta_where(Clause::meta("color", Compare::In, "red"));
        assert!(where_clause.ends_with("mq.meta_value IN ('red')))"));
    }

    #[test]
    fn test_meta_list_with_ordering_operator_is_skipped() {
        let ranges = FilterValue::Scalar(json!([1, 5]));
        assert_eq!(meta_where(Clause::meta("rating", Compare::Gte, ranges)), "");
        assert_eq!(
            meta_where(Clause::meta("color", Compare::NotEq, FilterValue::Scalar(json!([])))),
            ""
        );
    }

    #[test]
    fn test_taxonomy_group_rendering() {
        let mut group = FilterGroup::default();
        group.push_clause(Clause::taxonomy("category", FilterValue::Scalar(json!([4, 5]))));
        let mut query = PostQuery::new();
        query.set_filter_group(GroupKey::Taxonomy, group);

        let clauses = host().generate_clauses(&query);
        assert!(clauses.where_clause.contains("tt.taxonomy = 'category'"));
        assert!(clauses.where_clause.contains("t.term_id IN (4, 5)"));
    }

    #[test]
    fn test_structured_selector_is_skipped() {
        let mut group = FilterGroup::default();
        group.push_clause(Clause::taxonomy(
            "category",
            Clause::taxonomy("category", 4i64),
        ));
        let mut query = PostQuery::new();
        query.set_filter_group(GroupKey::Taxonomy, group);

        assert_eq!(host().generate_clauses(&query).where_clause, "");
    }

    #[test]
    fn test_execute_without_hooks_runs_statement() {
        let err = host().execute(&PostQuery::new(), None).unwrap_err();
        assert_eq!(err, HostError::Unavailable("not connected".into()));
    }
}
