//! Version archive
//!
//! A document's previous text is archived immediately before it is
//! overwritten, inside the same transaction. Version numbers per document are
//! 1-based and gapless; the `(document_id, version_number)` unique constraint
//! backs that at the schema level.

use crate::errors::{from_rusqlite, Result};
use crate::repo::{from_millis, new_id, to_millis};
use chrono::{DateTime, Utc};
use lawdelta_core::errors::LawDeltaError;
use lawdelta_core::model::DocumentVersion;
use rusqlite::{Connection, OptionalExtension, Row, Transaction};

const COLUMNS: &str =
    "id, document_id, version_number, full_text, markup, amendment_number, source_timestamp, created_at";

/// The pre-update state to archive
#[derive(Debug, Clone)]
pub struct ArchiveRequest<'a> {
    pub document_id: &'a str,
    pub full_text: &'a str,
    pub markup: Option<&'a str>,
    /// Instrument whose arrival triggered the overwrite
    pub amendment_number: Option<&'a str>,
    pub source_timestamp: DateTime<Utc>,
}

/// Archive the pre-update text as the document's next version.
///
/// Must run in the transaction that overwrites the document so both land or
/// neither does.
///
/// # Errors
///
/// - `InvariantViolation` if the existing versions are not `1..=n`
/// - `AlreadyExists` if the next number was taken concurrently
/// - `Persistence` on any database failure
pub fn archive_version(tx: &Transaction<'_>, req: &ArchiveRequest<'_>) -> Result<DocumentVersion> {
    let (max, count): (i64, i64) = tx
        .query_row(
            "SELECT COALESCE(MAX(version_number), 0), COUNT(*)
             FROM document_versions WHERE document_id = ?1",
            [req.document_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(from_rusqlite)?;

    if max != count {
        return Err(LawDeltaError::VersionGap {
            document_id: req.document_id.to_string(),
            version_number: max + 1,
        }
        .into());
    }

    let version = DocumentVersion {
        id: new_id(),
        document_id: req.document_id.to_string(),
        version_number: max + 1,
        full_text: req.full_text.to_string(),
        markup: req.markup.map(str::to_string),
        amendment_number: req.amendment_number.map(str::to_string),
        source_timestamp: req.source_timestamp,
        created_at: Utc::now(),
    };

    if VersionRepo::get_by_number(tx, req.document_id, version.version_number)?.is_some() {
        return Err(LawDeltaError::DuplicateVersion {
            document_id: req.document_id.to_string(),
            version_number: version.version_number,
        }
        .into());
    }

    tx.execute(
        &format!("INSERT INTO document_versions ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
        rusqlite::params![
            version.id,
            version.document_id,
            version.version_number,
            version.full_text,
            version.markup,
            version.amendment_number,
            to_millis(version.source_timestamp),
            to_millis(version.created_at),
        ],
    )
    .map_err(from_rusqlite)?;

    tracing::debug!(
        document_id = %version.document_id,
        version_number = version.version_number,
        "Archived document version"
    );
    Ok(version)
}

type VersionRow = (String, String, i64, String, Option<String>, Option<String>, i64, i64);

fn read_row(row: &Row<'_>) -> rusqlite::Result<VersionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_model(row: VersionRow) -> Result<DocumentVersion> {
    let (id, document_id, version_number, full_text, markup, amendment_number, source_ts, created) =
        row;
    Ok(DocumentVersion {
        id,
        document_id,
        version_number,
        full_text,
        markup,
        amendment_number,
        source_timestamp: from_millis("source_timestamp", source_ts)?,
        created_at: from_millis("created_at", created)?,
    })
}

/// Read access to `document_versions`
pub struct VersionRepo;

impl VersionRepo {
    /// All versions of a document, ascending by version number
    pub fn list_for_document(conn: &Connection, document_id: &str) -> Result<Vec<DocumentVersion>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM document_versions
                 WHERE document_id = ?1 ORDER BY version_number"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([document_id], read_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(into_model).collect()
    }

    pub fn get_by_number(
        conn: &Connection,
        document_id: &str,
        version_number: i64,
    ) -> Result<Option<DocumentVersion>> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM document_versions
                     WHERE document_id = ?1 AND version_number = ?2"
                ),
                rusqlite::params![document_id, version_number],
                read_row,
            )
            .optional()
            .map_err(from_rusqlite)?;
        row.map(into_model).transpose()
    }

    pub fn count(conn: &Connection, document_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM document_versions WHERE document_id = ?1",
            [document_id],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }
}
