//! Amendment registry
//!
//! One row per amending instrument and base document: an instrument that
//! amends several laws is registered once under each of them. Section changes
//! reference the row by id.

use crate::errors::{from_rusqlite, serialization_error, Result};
use crate::repo::{from_millis, from_opt_date, new_id, to_date, to_millis};
use chrono::{NaiveDate, Utc};
use lawdelta_core::model::{AffectedSections, AmendmentDocument};
use rusqlite::{Connection, OptionalExtension, Row, Transaction};

const COLUMNS: &str = "id, amendment_number, base_document_id, title, full_text, \
     detected_from_version_id, effective_date, affected_sections, created_at, updated_at";

/// What an update learned about an amending instrument
#[derive(Debug, Clone)]
pub struct AmendmentRecord<'a> {
    pub base_document_id: &'a str,
    /// `SFS 2025:732`
    pub amendment_number: &'a str,
    pub title: &'a str,
    pub full_text: Option<&'a str>,
    pub detected_from_version_id: Option<&'a str>,
    pub effective_date: Option<NaiveDate>,
    pub affected_sections: &'a AffectedSections,
}

struct AmendmentRow {
    id: String,
    amendment_number: String,
    base_document_id: String,
    title: String,
    full_text: Option<String>,
    detected_from_version_id: Option<String>,
    effective_date: Option<String>,
    affected_sections: String,
    created_at: i64,
    updated_at: i64,
}

impl AmendmentRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            amendment_number: row.get(1)?,
            base_document_id: row.get(2)?,
            title: row.get(3)?,
            full_text: row.get(4)?,
            detected_from_version_id: row.get(5)?,
            effective_date: row.get(6)?,
            affected_sections: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_model(self) -> Result<AmendmentDocument> {
        Ok(AmendmentDocument {
            id: self.id,
            amendment_number: self.amendment_number,
            base_document_id: self.base_document_id,
            title: self.title,
            full_text: self.full_text,
            detected_from_version_id: self.detected_from_version_id,
            effective_date: from_opt_date("effective_date", self.effective_date)?,
            affected_sections: serde_json::from_str(&self.affected_sections)
                .map_err(|e| serialization_error("affected_sections", e))?,
            created_at: from_millis("created_at", self.created_at)?,
            updated_at: from_millis("updated_at", self.updated_at)?,
        })
    }
}

fn merge_labels(into: &mut Vec<String>, from: &[String]) {
    for label in from {
        if !into.contains(label) {
            into.push(label.clone());
        }
    }
}

fn merge(into: &mut AffectedSections, from: &AffectedSections) {
    merge_labels(&mut into.added, &from.added);
    merge_labels(&mut into.amended, &from.amended);
    merge_labels(&mut into.repealed, &from.repealed);
}

/// Create the amendment row, or update the existing one for the same base
/// document and number.
///
/// An existing row keeps what it already knows: missing text, version link
/// and effective date are filled in, and affected sections are merged.
///
/// # Errors
///
/// `Persistence` or `Serialization` on database or JSON failure.
pub fn create_amendment_from_change(
    tx: &Transaction<'_>,
    record: &AmendmentRecord<'_>,
) -> Result<AmendmentDocument> {
    let now = Utc::now();

    let existing =
        AmendmentRepo::find_for_base(tx, record.base_document_id, record.amendment_number)?;
    if let Some(mut existing) = existing {
        merge(&mut existing.affected_sections, record.affected_sections);
        existing.full_text = existing.full_text.or(record.full_text.map(str::to_string));
        existing.detected_from_version_id = existing
            .detected_from_version_id
            .or(record.detected_from_version_id.map(str::to_string));
        existing.effective_date = existing.effective_date.or(record.effective_date);
        existing.updated_at = now;

        let affected = serde_json::to_string(&existing.affected_sections)
            .map_err(|e| serialization_error("affected_sections", e))?;
        tx.execute(
            "UPDATE amendment_documents
             SET full_text = ?2, detected_from_version_id = ?3, effective_date = ?4,
                 affected_sections = ?5, updated_at = ?6
             WHERE id = ?1",
            rusqlite::params![
                existing.id,
                existing.full_text,
                existing.detected_from_version_id,
                existing.effective_date.map(to_date),
                affected,
                to_millis(now),
            ],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(
            amendment_number = %existing.amendment_number,
            base_document_id = %existing.base_document_id,
            "Updated amendment"
        );
        return Ok(existing);
    }

    let amendment = AmendmentDocument {
        id: new_id(),
        amendment_number: record.amendment_number.to_string(),
        base_document_id: record.base_document_id.to_string(),
        title: record.title.to_string(),
        full_text: record.full_text.map(str::to_string),
        detected_from_version_id: record.detected_from_version_id.map(str::to_string),
        effective_date: record.effective_date,
        affected_sections: record.affected_sections.clone(),
        created_at: now,
        updated_at: now,
    };
    let affected = serde_json::to_string(&amendment.affected_sections)
        .map_err(|e| serialization_error("affected_sections", e))?;

    tx.execute(
        &format!(
            "INSERT INTO amendment_documents ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        rusqlite::params![
            amendment.id,
            amendment.amendment_number,
            amendment.base_document_id,
            amendment.title,
            amendment.full_text,
            amendment.detected_from_version_id,
            amendment.effective_date.map(to_date),
            affected,
            to_millis(now),
            to_millis(now),
        ],
    )
    .map_err(from_rusqlite)?;

    tracing::debug!(
        amendment_number = %amendment.amendment_number,
        base_document_id = %amendment.base_document_id,
        "Created amendment"
    );
    Ok(amendment)
}

/// Read access to `amendment_documents`
pub struct AmendmentRepo;

impl AmendmentRepo {
    /// The row registering `amendment_number` against one base document
    pub fn find_for_base(
        conn: &Connection,
        base_document_id: &str,
        amendment_number: &str,
    ) -> Result<Option<AmendmentDocument>> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM amendment_documents
                     WHERE base_document_id = ?1 AND amendment_number = ?2"
                ),
                [base_document_id, amendment_number],
                AmendmentRow::read,
            )
            .optional()
            .map_err(from_rusqlite)?;
        row.map(AmendmentRow::into_model).transpose()
    }

    /// Amendments of one base document, by effective date (undated last),
    /// then by registration order
    pub fn list_for_base(
        conn: &Connection,
        base_document_id: &str,
    ) -> Result<Vec<AmendmentDocument>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM amendment_documents
                 WHERE base_document_id = ?1
                 ORDER BY effective_date IS NULL, effective_date, created_at, id"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([base_document_id], AmendmentRow::read)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(AmendmentRow::into_model).collect()
    }
}
