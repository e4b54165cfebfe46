//! Background task search resource.
//!
//! Type and status ids are enriched with their labels. `task_params` is
//! stored as JSON text and decoded on read.

use crate::repo::search_repo::ResourceRepository;
use crate::search::adapter::ResourceAdapter;
use crate::search::error::{QueryResult, SearchError};
use crate::search::policy::ResourcePolicy;
use crate::search::store::{SqlRow, SqliteSearchStore};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const TASK_FIELDS: &[&str] = &[
    "task_id",
    "task_type_id",
    "task_status_id",
    "task_owner_id",
    "task_project_id",
    "task_progress_pct",
    "task_progress_msg",
    "task_creation_date",
    "task_start_date",
    "task_end_date",
];

const TASK_PROJECTION: &str = "tasks.task_id AS task_id,
    tasks.task_type_id AS task_type_id,
    task_types.task_type_label AS task_type,
    tasks.task_status_id AS task_status_id,
    task_statuses.task_status_label AS task_status,
    tasks.task_owner_id AS task_owner_id,
    tasks.task_project_id AS task_project_id,
    tasks.task_params AS task_params,
    tasks.task_progress_pct AS task_progress_pct,
    tasks.task_progress_msg AS task_progress_msg,
    tasks.task_result AS task_result,
    tasks.task_error AS task_error,
    tasks.task_log_file_path AS task_log_file_path,
    tasks.task_creation_date AS task_creation_date,
    tasks.task_start_date AS task_start_date,
    tasks.task_end_date AS task_end_date";

const TASK_JOIN: &str = "LEFT JOIN task_types ON task_types.task_type_id = tasks.task_type_id
    LEFT JOIN task_statuses ON task_statuses.task_status_id = tasks.task_status_id";

/// Public task shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: i64,
    pub task_type_id: i64,
    pub task_type: String,
    pub task_status_id: i64,
    pub task_status: String,
    pub task_owner_id: i64,
    pub task_project_id: Option<i64>,
    pub task_params: Option<serde_json::Value>,
    /// 0..=100.
    pub task_progress_pct: i64,
    pub task_progress_msg: Option<String>,
    pub task_result: Option<String>,
    pub task_error: Option<String>,
    pub task_log_file_path: Option<String>,
    pub task_creation_date: String,
    pub task_start_date: Option<String>,
    pub task_end_date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskResource;

impl ResourceAdapter for TaskResource {
    type Item = TaskRecord;

    fn resource(&self) -> &'static str {
        "tasks"
    }

    fn table(&self) -> &'static str {
        "tasks"
    }

    fn projection(&self) -> &'static str {
        TASK_PROJECTION
    }

    fn enrichment_join(&self) -> Option<&'static str> {
        Some(TASK_JOIN)
    }

    fn map_row(&self, row: &SqlRow) -> QueryResult<TaskRecord> {
        let task_params = match row.opt_text("task_params")? {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(|err| {
                SearchError::InvalidData(format!("invalid JSON in `task_params`: {err}"))
            })?),
            None => None,
        };

        Ok(TaskRecord {
            task_id: row.integer("task_id")?,
            task_type_id: row.integer("task_type_id")?,
            task_type: row.text("task_type")?,
            task_status_id: row.integer("task_status_id")?,
            task_status: row.text("task_status")?,
            task_owner_id: row.integer("task_owner_id")?,
            task_project_id: row.opt_integer("task_project_id")?,
            task_params,
            task_progress_pct: row.integer("task_progress_pct")?,
            task_progress_msg: row.opt_text("task_progress_msg")?,
            task_result: row.opt_text("task_result")?,
            task_error: row.opt_text("task_error")?,
            task_log_file_path: row.opt_text("task_log_file_path")?,
            task_creation_date: row.text("task_creation_date")?,
            task_start_date: row.opt_text("task_start_date")?,
            task_end_date: row.opt_text("task_end_date")?,
        })
    }
}

pub fn task_policy() -> ResourcePolicy {
    ResourcePolicy::with_fields(TASK_FIELDS.iter().copied())
}

pub type SqliteTaskRepository<'conn> = ResourceRepository<TaskResource, SqliteSearchStore<'conn>>;

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_policy(TaskResource, task_policy(), SqliteSearchStore::new(conn))
    }
}
