//! Facet orchestration
//!
//! `Idle -> Counting(f1) -> ... -> Counting(fn) -> Applying? -> Done`
//!
//! Each facet is counted on its own clone of the base query carrying every
//! other facet's filter. Counting passes run one at a time, in registration
//! order, with the interceptor hooks installed for the whole loop. Results
//! are computed once per engine and returned as is afterwards.

use std::rc::Rc;

use chrono::Utc;
use uuid::Uuid;

use super::composer::FilterComposer;
use super::config::{FacetConfig, FacetSpec};
use super::definition::{FacetDefinition, FacetKind};
use super::errors::FacetResult;
use super::interceptor::{HookGuard, Interceptor};
use super::registry::FacetRegistry;
use super::result::{FacetResults, FacetRow};
use crate::host::{CountingPass, FilterValue, Host, SearchQuery};
use crate::observability::{log_event, log_event_with_fields, Event, ObservationScope};

/// Computes facets for one base query
///
/// The engine is single-use: it owns the base query, memoizes its results
/// and is discarded afterwards. It is not `Sync`; concurrent callers must
/// serialize access themselves.
pub struct FacetEngine<'h, H: Host> {
    host: &'h H,
    query: H::Query,
    registry: FacetRegistry<H::Query>,
    computed: Option<FacetResults>,
}

impl<'h, H: Host> FacetEngine<'h, H> {
    pub fn new(host: &'h H, query: H::Query) -> Self {
        Self {
            host,
            query,
            registry: FacetRegistry::new(),
            computed: None,
        }
    }

    /// Registers a definition, replacing any facet of the same name
    pub fn register(&mut self, definition: FacetDefinition<H::Query>) {
        self.registry.register(definition);
    }

    pub fn register_taxonomy_facet(&mut self, taxonomy: &str, value: Option<FilterValue>) {
        self.register(
            FacetDefinition::new(taxonomy, FacetKind::Taxonomy).with_optional_value(value),
        );
    }

    pub fn register_meta_facet(&mut self, meta_key: &str, value: Option<FilterValue>) {
        self.register(FacetDefinition::new(meta_key, FacetKind::Meta).with_optional_value(value));
    }

    pub fn register_column_facet(&mut self, column: &str, value: Option<FilterValue>) {
        self.register(FacetDefinition::new(column, FacetKind::Column).with_optional_value(value));
    }

    /// Registers a facet whose filtering is done entirely by `filter`
    pub fn register_custom_facet<F>(&mut self, name: &str, kind: FacetKind, filter: F)
    where
        F: Fn(&mut H::Query, &FacetDefinition<H::Query>) + 'static,
    {
        self.register(FacetDefinition::new(name, kind).with_custom_filter(filter));
    }

    /// Registers a declared facet
    pub fn register_spec(&mut self, spec: FacetSpec) {
        self.register(spec.into_definition());
    }

    /// Registers every facet of a configuration, in order
    pub fn register_config(&mut self, config: FacetConfig) {
        for spec in config.facets {
            self.register_spec(spec);
        }
    }

    pub fn registry(&self) -> &FacetRegistry<H::Query> {
        &self.registry
    }

    /// The base query
    pub fn query(&self) -> &H::Query {
        &self.query
    }

    pub fn into_query(self) -> H::Query {
        self.query
    }

    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }

    /// Computes every registered facet, or returns the memoized result
    ///
    /// With `apply_filters`, every facet's filter is then applied to the
    /// base query so that executing it reflects all active selections.
    /// On error nothing is memoized, the base query is untouched and the
    /// host's hooks are removed.
    pub fn get_facets(&mut self, apply_filters: bool) -> FacetResult<&FacetResults> {
        let results = match self.computed.take() {
            Some(results) => {
                log_event(Event::CacheHit);
                results
            }
            None => self.compute(apply_filters)?,
        };
        let results: &FacetResults = self.computed.insert(results);
        Ok(results)
    }

    fn compute(&mut self, apply_filters: bool) -> FacetResult<FacetResults> {
        let scope = ObservationScope::with_fields(
            "FACETS",
            vec![
                ("run_id", Uuid::new_v4().to_string()),
                ("facets", self.registry.len().to_string()),
                ("started_at", Utc::now().to_rfc3339()),
            ],
        );

        let outcome = self.count_all().and_then(|results| {
            if apply_filters {
                self.apply_to_original()?;
            }
            Ok(results)
        });

        match &outcome {
            Ok(results) => {
                let captured = results.len().to_string();
                scope.complete_with_fields(&[("captured", captured.as_str())]);
            }
            Err(err) => scope.fail(&err.to_string()),
        }
        outcome
    }

    /// Runs one counting pass per facet with the hooks installed
    fn count_all(&self) -> FacetResult<FacetResults> {
        let interceptor = Rc::new(Interceptor::new(self.host.storage()));
        let _guard = HookGuard::install(self.host.hooks(), interceptor);

        let mut results = FacetResults::new();
        for definition in self.registry.iter() {
            let kind = definition.kind()?;

            let mut query = self.query.clone();
            query.disable_found_rows();
            FilterComposer::apply_all_except(&mut query, &self.registry, definition.name())?;

            let pass = CountingPass::new(definition.name(), kind);
            self.host.execute(&query, Some(&pass))?;

            let rows = pass
                .take_captured()
                .unwrap_or_default()
                .iter()
                .map(|row| FacetRow::from_row(definition.name(), row))
                .collect::<FacetResult<Vec<_>>>()?;
            results.insert(definition.name(), rows);
        }
        Ok(results)
    }

    /// Applies every facet's filter to the base query
    fn apply_to_original(&mut self) -> FacetResult<()> {
        let mut filtered = self.query.clone();
        FilterComposer::apply_all(&mut filtered, &self.registry)?;
        self.query = filtered;

        let applied = self.registry.len().to_string();
        log_event_with_fields(Event::FiltersApplied, &[("facets", applied.as_str())]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sql::{escape_sql, PostQuery, SqlHost};
    use crate::host::{GroupKey, HostResult, Row, Storage, TableNames};
    use serde_json::json;
    use std::cell::RefCell;

    /// Returns one `{value, count}` row per statement
    struct OneRow {
        tables: TableNames,
        statements: RefCell<Vec<String>>,
    }

    impl Storage for OneRow {
        fn run_statement(&self, statement: &str) -> HostResult<Vec<Row>> {
            self.statements.borrow_mut().push(statement.to_string());
            let mut row = Row::new();
            row.insert("value".into(), json!("x"));
            row.insert("count".into(), json!(1));
            Ok(vec![row])
        }

        fn escape_literal(&self, raw: &str) -> String {
            escape_sql(raw)
        }

        fn tables(&self) -> &TableNames {
            &self.tables
        }
    }

    fn setup() -> (Rc<OneRow>, SqlHost) {
        let storage = Rc::new(OneRow {
            tables: TableNames::default(),
            statements: RefCell::new(Vec::new()),
        });
        let host = SqlHost::new(storage.clone());
        (storage, host)
    }

    #[test]
    fn test_no_facets_yields_empty_result() {
        let (storage, host) = setup();
        let mut engine = FacetEngine::new(&host, PostQuery::new());

        assert!(engine.get_facets(true).unwrap().is_empty());
        assert!(storage.statements.borrow().is_empty());
        assert!(host.hooks().is_clean());
    }

    #[test]
    fn test_one_statement_per_facet() {
        let (storage, host) = setup();
        let mut engine = FacetEngine::new(&host, PostQuery::new());
        engine.register_column_facet("post_status", None);
        engine.register_meta_facet("rating", None);

        let results = engine.get_facets(false).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(storage.statements.borrow().len(), 2);
    }

    #[test]
    fn test_memoized_result() {
        let (storage, host) = setup();
        let mut engine = FacetEngine::new(&host, PostQuery::new());
        engine.register_column_facet("post_status", None);

        let first = engine.get_facets(true).unwrap().clone();
        assert!(engine.is_computed());
        let second = engine.get_facets(true).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(storage.statements.borrow().len(), 1);
    }

    #[test]
    fn test_counting_clone_disables_found_rows() {
        let (storage, host) = setup();
        let mut engine = FacetEngine::new(&host, PostQuery::new());
        engine.register_column_facet("post_status", None);
        engine.get_facets(false).unwrap();

        assert!(!storage.statements.borrow()[0].contains("SQL_CALC_FOUND_ROWS"));
        assert!(engine.query().counts_found_rows());
    }

    #[test]
    fn test_apply_filters_flag() {
        let (_storage, host) = setup();

        let mut engine = FacetEngine::new(&host, PostQuery::new());
        engine.register_meta_facet("rating", Some("3".into()));
        engine.get_facets(false).unwrap();
        assert!(engine.query().filter_group(GroupKey::Meta).is_none());

        let mut engine = FacetEngine::new(&host, PostQuery::new());
        engine.register_meta_facet("rating", Some("3".into()));
        engine.get_facets(true).unwrap();
        assert!(engine.query().filter_group(GroupKey::Meta).is_some());
    }
}
