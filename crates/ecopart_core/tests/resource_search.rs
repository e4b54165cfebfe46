use ecopart_core::db::open_db_in_memory;
use ecopart_core::{
    SearchError, SearchOptions, SearchService, SqliteEcotaxaAccountRepository,
    SqliteTaskRepository, SqliteUserRepository,
};
use rusqlite::Connection;
use serde_json::{json, Value};

fn seeded_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO users (first_name, last_name, email, password_hash, valid_email,
            confirmed_by_admin, is_admin, organisation, country, user_planned_usage,
            user_creation_date, deleted) VALUES
            ('Alice', 'Martin', 'alice@example.com', 'hash-a', 1, 1, 1, 'LOV', 'FR',
             'Mooring', '2024-01-10T00:00:00.000Z', NULL),
            ('Bob', 'Durand', 'bob@example.com', 'hash-b', 1, 0, 0, 'GEOMAR', 'DE',
             'Float', '2024-02-10T00:00:00.000Z', NULL),
            ('Carla', 'Rossi', 'carla@example.com', 'hash-c', 0, 0, 0, 'OGS', 'IT',
             'CTD rosette', '2024-03-10T00:00:00.000Z', '2024-06-01T00:00:00.000Z');

         INSERT INTO tasks (task_type_id, task_status_id, task_owner_id, task_project_id,
            task_params, task_progress_pct, task_progress_msg, task_error) VALUES
            (4, 3, 1, 10, '{\"samples\":[\"s1\",\"s2\"]}', 40, 'importing', NULL),
            (1, 5, 2, 11, NULL, 100, 'done', NULL),
            (6, 6, 1, 10, '{}', 70, NULL, 'ecotaxa unreachable');

         INSERT INTO ecotaxa_accounts (ecotaxa_account_ecopart_user_id,
            ecotaxa_account_ecotaxa_user_id, ecotaxa_account_ecotaxa_user_name,
            ecotaxa_account_user_email, ecotaxa_account_token, ecotaxa_account_instance_id,
            ecotaxa_account_expiration_date) VALUES
            (1, 501, 'alice.m', 'alice@example.com', 'token-a', 1, '2025-01-01T00:00:00.000Z'),
            (2, 502, 'bob.d', 'bob@example.com', 'token-b', 2, '2025-02-01T00:00:00.000Z');",
    )
    .unwrap();
    conn
}

fn options(sort_by: &str, filter: Value) -> SearchOptions {
    SearchOptions {
        sort_by: Some(sort_by.to_string()),
        filter: filter.as_array().cloned(),
        ..SearchOptions::default()
    }
}

#[test]
fn users_are_enriched_with_country_name() {
    let conn = seeded_db();
    let service = SearchService::new(SqliteUserRepository::new(&conn));

    let response = service
        .list(&options(
            "desc(user_id)",
            json!([{"field": "country", "operator": "IN", "value": ["FR", "IT"]}]),
        ))
        .unwrap();

    let names: Vec<_> = response
        .items
        .iter()
        .map(|user| (user.first_name.as_str(), user.country_name.as_deref()))
        .collect();
    assert_eq!(names, vec![("Carla", Some("Italy")), ("Alice", Some("France"))]);
    assert_eq!(response.search_info.total, 2);
}

#[test]
fn user_flags_accept_boolean_and_stringly_values() {
    let conn = seeded_db();
    let service = SearchService::new(SqliteUserRepository::new(&conn));

    let admins = service
        .list(&options(
            "asc(user_id)",
            json!([{"field": "is_admin", "operator": "=", "value": true}]),
        ))
        .unwrap();
    assert_eq!(admins.items.len(), 1);
    assert!(admins.items[0].is_admin);

    let unconfirmed = service
        .list(&options(
            "asc(user_id)",
            json!([{"field": "confirmed_by_admin", "operator": "=", "value": "false"}]),
        ))
        .unwrap();
    let emails: Vec<_> = unconfirmed.items.iter().map(|user| user.email.as_str()).collect();
    assert_eq!(emails, vec!["bob@example.com", "carla@example.com"]);
}

#[test]
fn deleted_users_are_found_through_null_sentinel() {
    let conn = seeded_db();
    let service = SearchService::new(SqliteUserRepository::new(&conn));

    let active = service
        .list(&options(
            "asc(user_id)",
            json!([{"field": "deleted", "operator": "=", "value": "null"}]),
        ))
        .unwrap();
    assert_eq!(active.search_info.total, 2);

    let deleted = service
        .list(&options(
            "asc(user_id)",
            json!([{"field": "deleted", "operator": "!=", "value": "null"}]),
        ))
        .unwrap();
    assert_eq!(deleted.items.len(), 1);
    assert_eq!(deleted.items[0].first_name, "Carla");
    assert!(deleted.items[0].deleted.is_some());
}

#[test]
fn secrets_and_enrichment_columns_are_not_searchable() {
    let conn = seeded_db();
    let users = SearchService::new(SqliteUserRepository::new(&conn));
    let err = users
        .list(&options(
            "asc(country_name)",
            json!([{"field": "password_hash", "operator": "LIKE", "value": "hash%"}]),
        ))
        .unwrap_err();
    assert!(matches!(err, SearchError::Unauthorized(_)));
    assert_eq!(
        err.to_string(),
        "Unauthorized sort_by: country_name, Filter field: password_hash"
    );

    let accounts = SearchService::new(SqliteEcotaxaAccountRepository::new(&conn));
    let err = accounts
        .list(&options(
            "asc(ecotaxa_account_id)",
            json!([{"field": "ecotaxa_account_token", "operator": "=", "value": "token-a"}]),
        ))
        .unwrap_err();
    assert_eq!(err.to_string(), "Filter field: ecotaxa_account_token");
}

#[test]
fn tasks_carry_labels_and_decoded_params() {
    let conn = seeded_db();
    let service = SearchService::new(SqliteTaskRepository::new(&conn));

    let response = service
        .list(&options(
            "asc(task_id)",
            json!([{"field": "task_owner_id", "operator": "=", "value": 1}]),
        ))
        .unwrap();

    assert_eq!(response.search_info.total, 2);
    let first = &response.items[0];
    assert_eq!(first.task_type, "IMPORT");
    assert_eq!(first.task_status, "RUNNING");
    assert_eq!(first.task_params.as_ref().unwrap()["samples"][0], "s1");

    let second = &response.items[1];
    assert_eq!(second.task_type, "IMPORT_ECO_TAXA");
    assert_eq!(second.task_status, "ERROR");
    assert_eq!(second.task_error.as_deref(), Some("ecotaxa unreachable"));
}

#[test]
fn task_ordering_filters_require_numbers() {
    let conn = seeded_db();
    let service = SearchService::new(SqliteTaskRepository::new(&conn));

    let busy = service
        .list(&options(
            "desc(task_progress_pct)",
            json!([{"field": "task_progress_pct", "operator": ">", "value": 50}]),
        ))
        .unwrap();
    let ids: Vec<_> = busy.items.iter().map(|task| task.task_id).collect();
    assert_eq!(ids, vec![2, 3]);

    let err = service
        .list(&options(
            "desc(task_progress_pct)",
            json!([{"field": "task_progress_pct", "operator": ">", "value": "50"}]),
        ))
        .unwrap_err();
    assert!(matches!(err, SearchError::Grammar(_)));
}

#[test]
fn malformed_task_params_fail_the_whole_request() {
    let conn = seeded_db();
    conn.execute(
        "INSERT INTO tasks (task_type_id, task_status_id, task_owner_id, task_params)
         VALUES (3, 1, 2, '{broken');",
        [],
    )
    .unwrap();
    let service = SearchService::new(SqliteTaskRepository::new(&conn));

    let err = service.list(&SearchOptions::default()).unwrap_err();
    assert!(matches!(err, SearchError::InvalidData(_)));
    assert!(!err.is_client_error());
}

#[test]
fn ecotaxa_accounts_are_enriched_with_instance_name() {
    let conn = seeded_db();
    let service = SearchService::new(SqliteEcotaxaAccountRepository::new(&conn));

    let response = service
        .list(&options(
            "asc(ecotaxa_account_id)",
            json!([{"field": "ecotaxa_account_instance_id", "operator": "<>", "value": 1}]),
        ))
        .unwrap();

    assert_eq!(response.items.len(), 1);
    let account = &response.items[0];
    assert_eq!(account.ecotaxa_account_ecotaxa_user_name, "bob.d");
    assert_eq!(account.ecotaxa_account_instance_name, "LOV_DEV");

    let serialized = serde_json::to_value(&response).unwrap();
    assert!(!serialized.to_string().contains("token-b"));
    assert_eq!(serialized["search_info"]["total"], 1);
}
