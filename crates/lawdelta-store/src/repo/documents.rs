//! Document repository

use crate::errors::{from_rusqlite, Result};
use crate::repo::{from_millis, from_opt_date, to_date, to_millis};
use chrono::{DateTime, NaiveDate, Utc};
use lawdelta_core::errors::{ExError, ExErrorKind, LawDeltaError};
use lawdelta_core::model::{ChangeEventKind, DocumentStatus, LegalDocument};
use rusqlite::{Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, document_number, title, content_type, full_text, markup, status, \
     publication_date, last_change_type, last_change_ref, last_change_at, created_at, updated_at";

struct DocumentRow {
    id: String,
    document_number: String,
    title: String,
    content_type: String,
    full_text: String,
    markup: Option<String>,
    status: String,
    publication_date: Option<String>,
    last_change_type: Option<String>,
    last_change_ref: Option<String>,
    last_change_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl DocumentRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            document_number: row.get(1)?,
            title: row.get(2)?,
            content_type: row.get(3)?,
            full_text: row.get(4)?,
            markup: row.get(5)?,
            status: row.get(6)?,
            publication_date: row.get(7)?,
            last_change_type: row.get(8)?,
            last_change_ref: row.get(9)?,
            last_change_at: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn into_model(self) -> Result<LegalDocument> {
        Ok(LegalDocument {
            id: self.id,
            document_number: self.document_number,
            title: self.title,
            content_type: self.content_type.parse()?,
            full_text: self.full_text,
            markup: self.markup,
            status: self.status.parse()?,
            publication_date: from_opt_date("publication_date", self.publication_date)?,
            last_change_type: self
                .last_change_type
                .map(|k| k.parse::<ChangeEventKind>())
                .transpose()?,
            last_change_ref: self.last_change_ref,
            last_change_at: self
                .last_change_at
                .map(|ms| from_millis("last_change_at", ms))
                .transpose()?,
            created_at: from_millis("created_at", self.created_at)?,
            updated_at: from_millis("updated_at", self.updated_at)?,
        })
    }
}

/// SQLite repository for `legal_documents`
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if a document with the same number is stored.
    pub fn insert(conn: &Connection, doc: &LegalDocument) -> Result<()> {
        if Self::find_by_number(conn, &doc.document_number)?.is_some() {
            return Err(ExError::new(ExErrorKind::AlreadyExists)
                .with_op("insert_document")
                .with_entity_id(doc.document_number.clone())
                .with_message("Document number already stored"));
        }

        conn.execute(
            &format!("INSERT INTO legal_documents ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"),
            rusqlite::params![
                doc.id,
                doc.document_number,
                doc.title,
                doc.content_type.as_str(),
                doc.full_text,
                doc.markup,
                doc.status.as_str(),
                doc.publication_date.map(to_date),
                doc.last_change_type.map(|k| k.as_str()),
                doc.last_change_ref,
                doc.last_change_at.map(to_millis),
                to_millis(doc.created_at),
                to_millis(doc.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;

        tracing::debug!(
            document_id = %doc.id,
            document_number = %doc.document_number,
            "Inserted document"
        );
        Ok(())
    }

    pub fn get(conn: &Connection, id: &str) -> Result<Option<LegalDocument>> {
        Self::query_one(conn, "id", id)
    }

    pub fn find_by_number(
        conn: &Connection,
        document_number: &str,
    ) -> Result<Option<LegalDocument>> {
        Self::query_one(conn, "document_number", document_number)
    }

    /// # Errors
    ///
    /// `NotFound` if no document carries this number.
    pub fn require_by_number(conn: &Connection, document_number: &str) -> Result<LegalDocument> {
        Self::find_by_number(conn, document_number)?.ok_or_else(|| {
            LawDeltaError::DocumentNotFound {
                document_number: document_number.to_string(),
            }
            .into()
        })
    }

    fn query_one(conn: &Connection, column: &str, value: &str) -> Result<Option<LegalDocument>> {
        let row = conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM legal_documents WHERE {column} = ?1"),
                [value],
                DocumentRow::read,
            )
            .optional()
            .map_err(from_rusqlite)?;
        row.map(DocumentRow::into_model).transpose()
    }

    /// Overwrite the current text. The caller archives the old text first.
    pub fn overwrite_text(
        conn: &Connection,
        id: &str,
        title: &str,
        full_text: &str,
        markup: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE legal_documents
             SET title = ?2, full_text = ?3, markup = ?4, updated_at = ?5
             WHERE id = ?1",
            rusqlite::params![id, title, full_text, markup, to_millis(at)],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// Fill the publication date if it is still unknown
    pub fn backfill_publication_date(conn: &Connection, id: &str, date: NaiveDate) -> Result<()> {
        conn.execute(
            "UPDATE legal_documents SET publication_date = ?2
             WHERE id = ?1 AND publication_date IS NULL",
            rusqlite::params![id, to_date(date)],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn set_status(
        conn: &Connection,
        id: &str,
        status: DocumentStatus,
        at: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE legal_documents SET status = ?2, updated_at = ?3 WHERE id = ?1",
            rusqlite::params![id, status.as_str(), to_millis(at)],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn record_last_change(
        conn: &Connection,
        id: &str,
        kind: ChangeEventKind,
        reference: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        conn.execute(
            "UPDATE legal_documents
             SET last_change_type = ?2, last_change_ref = ?3, last_change_at = ?4
             WHERE id = ?1",
            rusqlite::params![id, kind.as_str(), reference, to_millis(at)],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    /// All document numbers, sorted
    pub fn list_numbers(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn
            .prepare("SELECT document_number FROM legal_documents ORDER BY document_number")
            .map_err(from_rusqlite)?;
        let numbers = stmt
            .query_map([], |row| row.get(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(from_rusqlite)?;
        Ok(numbers)
    }
}
