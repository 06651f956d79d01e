//! Change event ledger

use crate::errors::{from_rusqlite, serialization_error, Result};
use crate::repo::{from_millis, new_id, to_millis};
use chrono::{DateTime, Utc};
use lawdelta_core::model::{ChangeEvent, ChangeEventKind, ContentType};
use rusqlite::{Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};

const COLUMNS: &str = "id, document_id, content_type, kind, amendment_number, diff_summary, \
     unified_diff, changed_sections, dedup_key, detected_at";

/// Key that identifies one logical event: the same kind and instrument
/// reaching the same text from the same archived version.
pub fn dedup_key(
    kind: ChangeEventKind,
    amendment_number: Option<&str>,
    version_id: Option<&str>,
    new_text: &str,
) -> String {
    let mut hasher = Sha256::new();
    let parts = [
        kind.as_str(),
        amendment_number.unwrap_or_default(),
        version_id.unwrap_or_default(),
    ];
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0]);
    }
    hasher.update(new_text.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct NewChangeEvent<'a> {
    pub document_id: &'a str,
    pub content_type: ContentType,
    pub kind: ChangeEventKind,
    pub amendment_number: Option<&'a str>,
    pub diff_summary: Option<&'a str>,
    pub unified_diff: Option<&'a str>,
    pub changed_sections: &'a [String],
    pub dedup_key: &'a str,
    pub detected_at: DateTime<Utc>,
}

struct EventRow {
    id: String,
    document_id: String,
    content_type: String,
    kind: String,
    amendment_number: Option<String>,
    diff_summary: Option<String>,
    unified_diff: Option<String>,
    changed_sections: String,
    dedup_key: String,
    detected_at: i64,
}

impl EventRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            document_id: row.get(1)?,
            content_type: row.get(2)?,
            kind: row.get(3)?,
            amendment_number: row.get(4)?,
            diff_summary: row.get(5)?,
            unified_diff: row.get(6)?,
            changed_sections: row.get(7)?,
            dedup_key: row.get(8)?,
            detected_at: row.get(9)?,
        })
    }

    fn into_model(self) -> Result<ChangeEvent> {
        Ok(ChangeEvent {
            id: self.id,
            document_id: self.document_id,
            content_type: self.content_type.parse()?,
            kind: self.kind.parse()?,
            amendment_number: self.amendment_number,
            diff_summary: self.diff_summary,
            unified_diff: self.unified_diff,
            changed_sections: serde_json::from_str(&self.changed_sections)
                .map_err(|e| serialization_error("changed_sections", e))?,
            dedup_key: self.dedup_key,
            detected_at: from_millis("detected_at", self.detected_at)?,
        })
    }
}

/// SQLite repository for `change_events`
pub struct ChangeEventRepo;

impl ChangeEventRepo {
    /// Append the event unless one with the same dedup key exists for the
    /// document. Returns the stored event when one was written.
    pub fn insert_if_absent(
        conn: &Connection,
        event: &NewChangeEvent<'_>,
    ) -> Result<Option<ChangeEvent>> {
        let exists = conn
            .query_row(
                "SELECT 1 FROM change_events WHERE document_id = ?1 AND dedup_key = ?2",
                rusqlite::params![event.document_id, event.dedup_key],
                |_| Ok(()),
            )
            .optional()
            .map_err(from_rusqlite)?
            .is_some();
        if exists {
            return Ok(None);
        }

        let stored = ChangeEvent {
            id: new_id(),
            document_id: event.document_id.to_string(),
            content_type: event.content_type,
            kind: event.kind,
            amendment_number: event.amendment_number.map(str::to_string),
            diff_summary: event.diff_summary.map(str::to_string),
            unified_diff: event.unified_diff.map(str::to_string),
            changed_sections: event.changed_sections.to_vec(),
            dedup_key: event.dedup_key.to_string(),
            detected_at: event.detected_at,
        };
        let sections = serde_json::to_string(&stored.changed_sections)
            .map_err(|e| serialization_error("changed_sections", e))?;

        conn.execute(
            &format!("INSERT INTO change_events ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
            rusqlite::params![
                stored.id,
                stored.document_id,
                stored.content_type.as_str(),
                stored.kind.as_str(),
                stored.amendment_number,
                stored.diff_summary,
                stored.unified_diff,
                sections,
                stored.dedup_key,
                to_millis(stored.detected_at),
            ],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(
            document_id = %stored.document_id,
            kind = stored.kind.as_str(),
            "Recorded change event"
        );
        Ok(Some(stored))
    }

    /// Events of one document, oldest first
    pub fn list_for_document(conn: &Connection, document_id: &str) -> Result<Vec<ChangeEvent>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM change_events
                 WHERE document_id = ?1 ORDER BY detected_at, id"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([document_id], EventRow::read)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(EventRow::into_model).collect()
    }
}
