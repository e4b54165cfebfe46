use ecopart_core::repo::instrument_model_repo::{instrument_model_policy, InstrumentModelResource};
use ecopart_core::repo::search_repo::ResourceRepository;
use ecopart_core::search::compiler::CompiledQuery;
use ecopart_core::search::error::QueryResult;
use ecopart_core::search::model::FilterOperator;
use ecopart_core::search::policy::{ResourcePolicy, DEFAULT_SORT_DIRECTIONS};
use ecopart_core::search::store::{SearchStore, SqlRow};
use ecopart_core::{SearchError, SearchOptions, SearchService};
use rusqlite::types::Value;
use serde_json::json;
use std::cell::{Cell, RefCell};

/// Store double that records every statement it is asked to run.
#[derive(Default)]
struct CountingStore {
    calls: Cell<usize>,
    last: RefCell<Option<CompiledQuery>>,
}

impl SearchStore for &CountingStore {
    fn execute(&self, query: &CompiledQuery) -> QueryResult<Vec<SqlRow>> {
        self.calls.set(self.calls.get() + 1);
        *self.last.borrow_mut() = Some(query.clone());
        Ok(Vec::new())
    }
}

fn service(
    store: &CountingStore,
    policy: ResourcePolicy,
) -> SearchService<ResourceRepository<InstrumentModelResource, &CountingStore>> {
    SearchService::new(ResourceRepository::with_policy(
        InstrumentModelResource,
        policy,
        store,
    ))
}

fn filters(value: serde_json::Value) -> Option<Vec<serde_json::Value>> {
    value.as_array().cloned()
}

#[test]
fn unauthorized_requests_never_reach_the_store() {
    let store = CountingStore::default();
    let service = service(&store, instrument_model_policy());

    let rejected = [
        SearchOptions {
            sort_by: Some("asc(password)".to_string()),
            ..SearchOptions::default()
        },
        SearchOptions {
            sort_by: Some("ASC(instrument_model_id)".to_string()),
            ..SearchOptions::default()
        },
        SearchOptions {
            filter: filters(json!([{"field": "token", "operator": "=", "value": "x"}])),
            ..SearchOptions::default()
        },
    ];
    for options in &rejected {
        let err = service.list(options).unwrap_err();
        assert!(matches!(err, SearchError::Unauthorized(_)), "{err}");
    }

    assert_eq!(store.calls.get(), 0);
}

#[test]
fn grammar_errors_never_reach_the_store() {
    let store = CountingStore::default();
    let service = service(&store, instrument_model_policy());

    let rejected = [
        SearchOptions {
            page: Some(0),
            ..SearchOptions::default()
        },
        SearchOptions {
            sort_by: Some("instrument_model_id".to_string()),
            ..SearchOptions::default()
        },
        SearchOptions {
            filter: filters(json!([{"field": "instrument_model_id", "operator": ">"}])),
            ..SearchOptions::default()
        },
    ];
    for options in &rejected {
        let err = service.list(options).unwrap_err();
        assert!(matches!(err, SearchError::Grammar(_)), "{err}");
    }

    assert_eq!(store.calls.get(), 0);
}

#[test]
fn restricted_operator_set_is_enforced() {
    let store = CountingStore::default();
    let policy = ResourcePolicy::new(
        ["instrument_model_name"],
        [FilterOperator::Eq],
        DEFAULT_SORT_DIRECTIONS.iter().copied(),
    );
    let service = service(&store, policy);

    let err = service
        .list(&SearchOptions {
            filter: filters(json!([
                {"field": "instrument_model_name", "operator": "LIKE", "value": "UVP%"}
            ])),
            ..SearchOptions::default()
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Filter operator: LIKE");
    assert_eq!(store.calls.get(), 0);
}

#[test]
fn authorized_request_runs_exactly_one_statement_with_bound_values() {
    let store = CountingStore::default();
    let service = service(&store, instrument_model_policy());

    let response = service
        .list(&SearchOptions {
            page: Some(3),
            limit: Some(5),
            sort_by: Some("desc(instrument_model_name)".to_string()),
            filter: filters(json!([
                {"field": "instrument_model_name", "operator": "=", "value": "UVP5HD'; DROP TABLE users; --"}
            ])),
        })
        .unwrap();

    assert!(response.items.is_empty());
    assert_eq!(store.calls.get(), 1);

    let query = store.last.borrow().clone().unwrap();
    assert!(!query.sql.contains("DROP TABLE"));
    let injected = Value::Text("UVP5HD'; DROP TABLE users; --".to_string());
    assert_eq!(
        query.params,
        vec![
            injected.clone(),
            injected,
            Value::Integer(5),
            Value::Integer(10),
        ]
    );
    assert!(query
        .sql
        .contains("ORDER BY instrument_models.instrument_model_name desc"));
}
