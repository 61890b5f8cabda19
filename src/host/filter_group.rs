//! Typed filter groups
//!
//! Taxonomy and meta filters are nested groups of clauses combined with
//! a relation. A group may contain further groups, so a caller-supplied
//! fragment can be appended to a group without flattening it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Combination relation of a filter group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Relation {
    #[default]
    And,
    Or,
}

impl Relation {
    /// Returns the SQL keyword
    pub fn as_sql(&self) -> &'static str {
        match self {
            Relation::And => "AND",
            Relation::Or => "OR",
        }
    }
}

/// Meta comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compare {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "LIKE")]
    Like,
    #[serde(rename = "IN")]
    In,
}

impl Compare {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Compare::Eq => "=",
            Compare::NotEq => "!=",
            Compare::Gt => ">",
            Compare::Gte => ">=",
            Compare::Lt => "<",
            Compare::Lte => "<=",
            Compare::Like => "LIKE",
            Compare::In => "IN",
        }
    }
}

/// Term column a taxonomy clause selects on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermField {
    #[default]
    TermId,
    Slug,
    Name,
}

impl TermField {
    pub fn column(&self) -> &'static str {
        match self {
            TermField::TermId => "term_id",
            TermField::Slug => "slug",
            TermField::Name => "name",
        }
    }
}

/// A filter value: either a plain scalar (or list of scalars) or a
/// structured fragment to be appended to a filter group as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Fragment(FilterNode),
    Scalar(Value),
}

impl FilterValue {
    /// Shorthand for a scalar value
    pub fn scalar(value: impl Into<Value>) -> Self {
        FilterValue::Scalar(value.into())
    }

    /// Returns the fragment if this value is structured
    pub fn as_fragment(&self) -> Option<&FilterNode> {
        match self {
            FilterValue::Fragment(node) => Some(node),
            FilterValue::Scalar(_) => None,
        }
    }

    /// Returns the scalar if this value is not structured
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FilterValue::Scalar(v) => Some(v),
            FilterValue::Fragment(_) => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Scalar(Value::String(s))
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        FilterValue::Scalar(Value::from(n))
    }
}

impl From<FilterNode> for FilterValue {
    fn from(node: FilterNode) -> Self {
        FilterValue::Fragment(node)
    }
}

impl From<Clause> for FilterValue {
    fn from(clause: Clause) -> Self {
        FilterValue::Fragment(FilterNode::Clause(clause))
    }
}

/// A single filter clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Clause {
    Taxonomy {
        taxonomy: String,
        #[serde(default)]
        field: TermField,
        terms: Box<FilterValue>,
    },
    Meta {
        key: String,
        #[serde(default)]
        compare: Compare,
        value: Box<FilterValue>,
    },
}

impl Clause {
    /// Clause matching `taxonomy` against term ids
    pub fn taxonomy(taxonomy: impl Into<String>, terms: impl Into<FilterValue>) -> Self {
        Clause::Taxonomy {
            taxonomy: taxonomy.into(),
            field: TermField::TermId,
            terms: Box::new(terms.into()),
        }
    }

    /// Clause comparing meta `key` against `value`
    pub fn meta(key: impl Into<String>, compare: Compare, value: impl Into<FilterValue>) -> Self {
        Clause::Meta {
            key: key.into(),
            compare,
            value: Box::new(value.into()),
        }
    }
}

/// Either a clause or a nested group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Clause(Clause),
}

/// An ordered list of clauses combined with one relation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterGroup {
    #[serde(default)]
    pub relation: Relation,
    pub clauses: Vec<FilterNode>,
}

impl FilterGroup {
    /// Creates an empty group with the given relation
    pub fn new(relation: Relation) -> Self {
        Self {
            relation,
            clauses: Vec::new(),
        }
    }

    /// Appends a clause
    pub fn push_clause(&mut self, clause: Clause) {
        self.clauses.push(FilterNode::Clause(clause));
    }

    /// Appends a node (clause or nested group) verbatim
    pub fn push(&mut self, node: FilterNode) {
        self.clauses.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}

/// Named filter groups a query carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Taxonomy,
    Meta,
}
