//! Facet results

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{FacetError, FacetResult};
use crate::host::Row;

/// One distinct value of a facet and the number of matching posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetRow {
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub count: u64,
}

impl FacetRow {
    pub fn new(value: impl Into<Value>, label: Option<&str>, count: u64) -> Self {
        Self {
            value: value.into(),
            label: label.map(str::to_string),
            count,
        }
    }

    /// Reads a captured storage row
    ///
    /// `value` is required. `count` may be a number or a numeric string,
    /// as drivers differ. `label` falls back to `name` when absent.
    pub fn from_row(facet: &str, row: &Row) -> FacetResult<Self> {
        let value = row
            .get("value")
            .cloned()
            .ok_or_else(|| FacetError::invalid_row(facet, "missing value column"))?;

        let count = match row.get("count") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| FacetError::invalid_row(facet, "missing or non-numeric count"))?;

        let label = row
            .get("label")
            .or_else(|| row.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            value,
            label,
            count,
        })
    }
}

/// Rows per facet, in registration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetResults {
    facets: IndexMap<String, Vec<FacetRow>>,
}

impl FacetResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, facet: impl Into<String>, rows: Vec<FacetRow>) {
        self.facets.insert(facet.into(), rows);
    }

    pub fn get(&self, facet: &str) -> Option<&[FacetRow]> {
        self.facets.get(facet).map(Vec::as_slice)
    }

    /// Count for one value of a facet
    pub fn count_of(&self, facet: &str, value: &Value) -> Option<u64> {
        self.get(facet)?
            .iter()
            .find(|row| &row.value == value)
            .map(|row| row.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FacetRow])> {
        self.facets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("row fixture must be an object"),
        }
    }

    #[test]
    fn test_from_row_taxonomy() {
        let r = row(json!({"value": "news", "label": "News", "count": 7}));
        assert_eq!(
            FacetRow::from_row("category", &r).unwrap(),
            FacetRow::new("news", Some("News"), 7)
        );
    }

    #[test]
    fn test_from_row_string_count() {
        let r = row(json!({"value": "3", "count": "12"}));
        let parsed = FacetRow::from_row("rating", &r).unwrap();
        assert_eq!(parsed.count, 12);
        assert_eq!(parsed.label, None);
    }

    #[test]
    fn test_from_row_name_fallback() {
        let r = row(json!({"value": "news", "name": "News", "count": 1}));
        assert_eq!(FacetRow::from_row("category", &r).unwrap().label.as_deref(), Some("News"));
    }

    #[test]
    fn test_from_row_rejects_missing_fields() {
        let err = FacetRow::from_row("rating", &row(json!({"count": 1}))).unwrap_err();
        assert_eq!(err.code(), "FACET_INVALID_ROW");

        let err = FacetRow::from_row("rating", &row(json!({"value": "3", "count": "many"})))
            .unwrap_err();
        assert_eq!(err.code(), "FACET_INVALID_ROW");
    }

    #[test]
    fn test_results_serialize_in_insertion_order() {
        let mut results = FacetResults::new();
        results.insert("status", vec![FacetRow::new("publish", None, 2)]);
        results.insert("category", vec![FacetRow::new("news", Some("News"), 1)]);

        let out = serde_json::to_string(&results).unwrap();
        assert_eq!(
            out,
            r#"{"status":[{"value":"publish","count":2}],"category":[{"value":"news","label":"News","count":1}]}"#
        );
        assert_eq!(results.count_of("status", &json!("publish")), Some(2));
        assert_eq!(results.count_of("status", &json!("draft")), None);
    }
}
