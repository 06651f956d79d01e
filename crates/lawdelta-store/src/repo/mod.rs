//! Repository layer: one module per table

pub mod amendments;
pub mod change_events;
pub mod documents;
pub mod section_changes;
pub mod versions;

pub use amendments::{create_amendment_from_change, AmendmentRecord, AmendmentRepo};
pub use change_events::{dedup_key, ChangeEventRepo, NewChangeEvent};
pub use documents::DocumentRepo;
pub use section_changes::{NewSectionChange, SectionChangeRepo};
pub use versions::{archive_version, ArchiveRequest, VersionRepo};

use crate::errors::{serialization_error, Result};
use chrono::{DateTime, NaiveDate, Utc};

pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(column: &str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| serialization_error(column, format!("timestamp {} out of range", millis)))
}

pub(crate) fn to_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn from_date(column: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| serialization_error(column, e))
}

pub(crate) fn from_opt_date(column: &str, raw: Option<String>) -> Result<Option<NaiveDate>> {
    raw.map(|r| from_date(column, &r)).transpose()
}
