//! Instrument model search resource.
//!
//! Instrument models are reference rows (UVP5/UVP6 families) seeded by
//! migrations; they carry no enrichment join.

use crate::repo::search_repo::ResourceRepository;
use crate::search::adapter::ResourceAdapter;
use crate::search::error::QueryResult;
use crate::search::policy::ResourcePolicy;
use crate::search::store::{SqlRow, SqliteSearchStore};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Fields callers may filter and sort on.
pub const INSTRUMENT_MODEL_FIELDS: &[&str] = &[
    "instrument_model_id",
    "instrument_model_name",
    "bodc_url",
    "instrument_model_description",
];

const INSTRUMENT_MODEL_PROJECTION: &str = "instrument_models.instrument_model_id AS instrument_model_id,
    instrument_models.instrument_model_name AS instrument_model_name,
    instrument_models.bodc_url AS bodc_url,
    instrument_models.instrument_model_description AS instrument_model_description";

/// Public instrument model shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentModel {
    pub instrument_model_id: i64,
    pub instrument_model_name: String,
    /// NERC vocabulary URL, when the model is registered there.
    pub bodc_url: Option<String>,
    pub instrument_model_description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstrumentModelResource;

impl ResourceAdapter for InstrumentModelResource {
    type Item = InstrumentModel;

    fn resource(&self) -> &'static str {
        "instrument_models"
    }

    fn table(&self) -> &'static str {
        "instrument_models"
    }

    fn projection(&self) -> &'static str {
        INSTRUMENT_MODEL_PROJECTION
    }

    fn map_row(&self, row: &SqlRow) -> QueryResult<InstrumentModel> {
        Ok(InstrumentModel {
            instrument_model_id: row.integer("instrument_model_id")?,
            instrument_model_name: row.text("instrument_model_name")?,
            bodc_url: row.opt_text("bodc_url")?,
            instrument_model_description: row.opt_text("instrument_model_description")?,
        })
    }
}

/// Default allowlist for instrument model searches.
pub fn instrument_model_policy() -> ResourcePolicy {
    ResourcePolicy::with_fields(INSTRUMENT_MODEL_FIELDS.iter().copied())
}

pub type SqliteInstrumentModelRepository<'conn> =
    ResourceRepository<InstrumentModelResource, SqliteSearchStore<'conn>>;

impl<'conn> SqliteInstrumentModelRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_policy(
            InstrumentModelResource,
            instrument_model_policy(),
            SqliteSearchStore::new(conn),
        )
    }
}
