//! Host collaborator contracts
//!
//! The facet engine does not build or run queries itself. It relies on a
//! host environment that owns the query object, turns it into clauses and
//! a statement, and calls back into two hook slots while doing so.
//!
//! # Contracts
//!
//! - [`SearchQuery`]: clonable query with named vars and filter groups
//! - [`Host`]: the execution pipeline plus its [`HookRegistry`]
//! - [`Storage`]: low-level statement execution and literal escaping
//!
//! [`sql`] provides a reference host over a WordPress-shaped schema.

mod config;
mod errors;
mod filter_group;
mod hooks;
pub mod sql;

pub use config::TableNames;
pub use errors::{HostError, HostResult};
pub use filter_group::{
    Clause, Compare, FilterGroup, FilterNode, FilterValue, GroupKey, Relation, TermField,
};
pub use hooks::{ClauseHook, CountingPass, HookRegistry, RequestHook};

use std::rc::Rc;

/// A result row as returned by the storage layer
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Query object the facets are derived from
///
/// `clone` must produce an independent copy: mutating the clone never
/// affects the original.
pub trait SearchQuery: Clone {
    /// Returns a query var
    fn var(&self, name: &str) -> Option<&FilterValue>;

    /// Sets a query var, replacing any previous value
    fn set_var(&mut self, name: &str, value: FilterValue);

    /// Returns a named filter group, if one was set
    fn filter_group(&self, key: GroupKey) -> Option<&FilterGroup>;

    /// Replaces a named filter group
    fn set_filter_group(&mut self, key: GroupKey, group: FilterGroup);

    /// Skips total-count bookkeeping on execution
    fn disable_found_rows(&mut self);
}

/// Low-level statement execution primitive
pub trait Storage {
    /// Runs a statement and returns its rows
    fn run_statement(&self, statement: &str) -> HostResult<Vec<Row>>;

    /// Escapes a string for embedding in a quoted literal or identifier
    fn escape_literal(&self, raw: &str) -> String;

    /// Table names used in generated clauses
    fn tables(&self) -> &TableNames;
}

/// Clause components of a generated statement
///
/// Hooks receive the bundle mutably before the statement is assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClauseBundle {
    pub fields: String,
    pub join: String,
    /// Conditions, each prefixed with ` AND `
    pub where_clause: String,
    pub groupby: String,
    pub orderby: String,
    pub limits: String,
}

impl ClauseBundle {
    /// Assembles the final statement against `from_table`
    pub fn assemble(&self, from_table: &str) -> String {
        let mut statement = format!("SELECT {} FROM {}", self.fields, from_table);
        if !self.join.is_empty() {
            statement.push(' ');
            statement.push_str(self.join.trim_start());
        }
        statement.push_str(" WHERE 1=1");
        statement.push_str(&self.where_clause);
        if !self.groupby.is_empty() {
            statement.push_str(" GROUP BY ");
            statement.push_str(&self.groupby);
        }
        if !self.orderby.is_empty() {
            statement.push_str(" ORDER BY ");
            statement.push_str(&self.orderby);
        }
        if !self.limits.is_empty() {
            statement.push(' ');
            statement.push_str(&self.limits);
        }
        statement
    }
}

/// The host execution pipeline
pub trait Host {
    type Query: SearchQuery;

    /// Hook slots consulted during execution
    fn hooks(&self) -> &HookRegistry;

    /// Storage handle used to run statements directly
    fn storage(&self) -> Rc<dyn Storage>;

    /// Generates clauses, runs the installed hooks and executes the
    /// resulting statement.
    ///
    /// `pass` is set when the execution is a facet counting pass and is
    /// forwarded to the hooks. An empty statement returned by the request
    /// hook means nothing is executed and no rows are returned.
    fn execute(&self, query: &Self::Query, pass: Option<&CountingPass>) -> HostResult<Vec<Row>>;
}
