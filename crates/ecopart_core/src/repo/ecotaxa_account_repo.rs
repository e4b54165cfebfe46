//! EcoTaxa account link search resource.
//!
//! # Invariants
//! - Account tokens are never projected.
//! - The instance id is enriched with the instance display name.

use crate::repo::search_repo::ResourceRepository;
use crate::search::adapter::ResourceAdapter;
use crate::search::error::QueryResult;
use crate::search::policy::ResourcePolicy;
use crate::search::store::{SqlRow, SqliteSearchStore};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const ECOTAXA_ACCOUNT_FIELDS: &[&str] = &[
    "ecotaxa_account_id",
    "ecotaxa_account_ecopart_user_id",
    "ecotaxa_account_ecotaxa_user_id",
    "ecotaxa_account_ecotaxa_user_name",
    "ecotaxa_account_user_email",
    "ecotaxa_account_instance_id",
    "ecotaxa_account_expiration_date",
];

const ECOTAXA_ACCOUNT_PROJECTION: &str = "ecotaxa_accounts.ecotaxa_account_id AS ecotaxa_account_id,
    ecotaxa_accounts.ecotaxa_account_ecopart_user_id AS ecotaxa_account_ecopart_user_id,
    ecotaxa_accounts.ecotaxa_account_ecotaxa_user_id AS ecotaxa_account_ecotaxa_user_id,
    ecotaxa_accounts.ecotaxa_account_ecotaxa_user_name AS ecotaxa_account_ecotaxa_user_name,
    ecotaxa_accounts.ecotaxa_account_user_email AS ecotaxa_account_user_email,
    ecotaxa_accounts.ecotaxa_account_instance_id AS ecotaxa_account_instance_id,
    ecotaxa_instances.ecotaxa_instance_name AS ecotaxa_account_instance_name,
    ecotaxa_accounts.ecotaxa_account_expiration_date AS ecotaxa_account_expiration_date";

const ECOTAXA_ACCOUNT_JOIN: &str = "LEFT JOIN ecotaxa_instances
    ON ecotaxa_instances.ecotaxa_instance_id = ecotaxa_accounts.ecotaxa_account_instance_id";

/// Public EcoTaxa account link shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcotaxaAccountRecord {
    pub ecotaxa_account_id: i64,
    pub ecotaxa_account_ecopart_user_id: i64,
    pub ecotaxa_account_ecotaxa_user_id: i64,
    pub ecotaxa_account_ecotaxa_user_name: String,
    pub ecotaxa_account_user_email: String,
    pub ecotaxa_account_instance_id: i64,
    pub ecotaxa_account_instance_name: String,
    pub ecotaxa_account_expiration_date: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EcotaxaAccountResource;

impl ResourceAdapter for EcotaxaAccountResource {
    type Item = EcotaxaAccountRecord;

    fn resource(&self) -> &'static str {
        "ecotaxa_accounts"
    }

    fn table(&self) -> &'static str {
        "ecotaxa_accounts"
    }

    fn projection(&self) -> &'static str {
        ECOTAXA_ACCOUNT_PROJECTION
    }

    fn enrichment_join(&self) -> Option<&'static str> {
        Some(ECOTAXA_ACCOUNT_JOIN)
    }

    fn map_row(&self, row: &SqlRow) -> QueryResult<EcotaxaAccountRecord> {
        Ok(EcotaxaAccountRecord {
            ecotaxa_account_id: row.integer("ecotaxa_account_id")?,
            ecotaxa_account_ecopart_user_id: row.integer("ecotaxa_account_ecopart_user_id")?,
            ecotaxa_account_ecotaxa_user_id: row.integer("ecotaxa_account_ecotaxa_user_id")?,
            ecotaxa_account_ecotaxa_user_name: row.text("ecotaxa_account_ecotaxa_user_name")?,
            ecotaxa_account_user_email: row.text("ecotaxa_account_user_email")?,
            ecotaxa_account_instance_id: row.integer("ecotaxa_account_instance_id")?,
            ecotaxa_account_instance_name: row.text("ecotaxa_account_instance_name")?,
            ecotaxa_account_expiration_date: row.text("ecotaxa_account_expiration_date")?,
        })
    }
}

pub fn ecotaxa_account_policy() -> ResourcePolicy {
    ResourcePolicy::with_fields(ECOTAXA_ACCOUNT_FIELDS.iter().copied())
}

pub type SqliteEcotaxaAccountRepository<'conn> =
    ResourceRepository<EcotaxaAccountResource, SqliteSearchStore<'conn>>;

impl<'conn> SqliteEcotaxaAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_policy(
            EcotaxaAccountResource,
            ecotaxa_account_policy(),
            SqliteSearchStore::new(conn),
        )
    }
}
