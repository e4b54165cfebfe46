//! User search resource.
//!
//! # Invariants
//! - Password hashes are never projected.
//! - Country codes are enriched with the country display name.

use crate::repo::search_repo::ResourceRepository;
use crate::search::adapter::ResourceAdapter;
use crate::search::error::QueryResult;
use crate::search::policy::ResourcePolicy;
use crate::search::store::{SqlRow, SqliteSearchStore};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const USER_FIELDS: &[&str] = &[
    "user_id",
    "first_name",
    "last_name",
    "email",
    "valid_email",
    "confirmed_by_admin",
    "is_admin",
    "organisation",
    "country",
    "user_planned_usage",
    "user_creation_date",
    "deleted",
];

const USER_PROJECTION: &str = "users.user_id AS user_id,
    users.first_name AS first_name,
    users.last_name AS last_name,
    users.email AS email,
    users.valid_email AS valid_email,
    users.confirmed_by_admin AS confirmed_by_admin,
    users.is_admin AS is_admin,
    users.organisation AS organisation,
    users.country AS country,
    countries.country_name AS country_name,
    users.user_planned_usage AS user_planned_usage,
    users.user_creation_date AS user_creation_date,
    users.deleted AS deleted";

const USER_JOIN: &str = "LEFT JOIN countries ON countries.country_code = users.country";

/// Public user shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub valid_email: bool,
    pub confirmed_by_admin: bool,
    pub is_admin: bool,
    pub organisation: String,
    /// ISO 3166 alpha-2 code.
    pub country: String,
    pub country_name: Option<String>,
    pub user_planned_usage: String,
    pub user_creation_date: String,
    /// Deletion timestamp; `None` for active accounts.
    pub deleted: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserResource;

impl ResourceAdapter for UserResource {
    type Item = UserRecord;

    fn resource(&self) -> &'static str {
        "users"
    }

    fn table(&self) -> &'static str {
        "users"
    }

    fn projection(&self) -> &'static str {
        USER_PROJECTION
    }

    fn enrichment_join(&self) -> Option<&'static str> {
        Some(USER_JOIN)
    }

    fn map_row(&self, row: &SqlRow) -> QueryResult<UserRecord> {
        Ok(UserRecord {
            user_id: row.integer("user_id")?,
            first_name: row.text("first_name")?,
            last_name: row.text("last_name")?,
            email: row.text("email")?,
            valid_email: row.flag("valid_email")?,
            confirmed_by_admin: row.flag("confirmed_by_admin")?,
            is_admin: row.flag("is_admin")?,
            organisation: row.text("organisation")?,
            country: row.text("country")?,
            country_name: row.opt_text("country_name")?,
            user_planned_usage: row.text("user_planned_usage")?,
            user_creation_date: row.text("user_creation_date")?,
            deleted: row.opt_text("deleted")?,
        })
    }
}

pub fn user_policy() -> ResourcePolicy {
    ResourcePolicy::with_fields(USER_FIELDS.iter().copied())
}

pub type SqliteUserRepository<'conn> = ResourceRepository<UserResource, SqliteSearchStore<'conn>>;

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_policy(UserResource, user_policy(), SqliteSearchStore::new(conn))
    }
}
