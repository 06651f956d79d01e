//! Section change ledger
//!
//! Append-only. Each row is identified by a content digest over the change,
//! its effective date and the version it was classified against; inserting a
//! digest that is already stored for the document is a no-op.

use crate::errors::{from_rusqlite, serialization_error, Result};
use crate::repo::{from_date, from_millis, new_id, to_date, to_millis};
use chrono::{NaiveDate, Utc};
use lawdelta_core::model::{
    ChangeTarget, ProvisionNumber, SectionChange, SectionChangeDraft, SectionChangeKind,
    SectionKey,
};
use rusqlite::{Connection, OptionalExtension, Row};

const COLUMNS: &str = "seq, id, document_id, amendment_id, version_id, scope, chapter_number, \
     chapter_suffix, section_number, section_suffix, heading, old_text, new_text, change_kind, \
     effective_date, digest, created_at";

const SCOPE_SECTION: &str = "section";
const SCOPE_WHOLE_DOCUMENT: &str = "whole_document";

/// A classified draft bound to its document, amendment and date
#[derive(Debug, Clone)]
pub struct NewSectionChange<'a> {
    pub document_id: &'a str,
    pub amendment_id: Option<&'a str>,
    pub version_id: Option<&'a str>,
    pub draft: &'a SectionChangeDraft,
    pub effective_date: NaiveDate,
}

struct ChangeRow {
    seq: i64,
    id: String,
    document_id: String,
    amendment_id: Option<String>,
    version_id: Option<String>,
    scope: String,
    chapter_number: Option<u32>,
    chapter_suffix: Option<String>,
    section_number: Option<u32>,
    section_suffix: Option<String>,
    heading: Option<String>,
    old_text: Option<String>,
    new_text: Option<String>,
    change_kind: String,
    effective_date: String,
    digest: String,
    created_at: i64,
}

fn suffix_to_column(suffix: Option<char>) -> Option<String> {
    suffix.map(String::from)
}

fn suffix_from_column(column: &str, raw: Option<String>) -> Result<Option<char>> {
    match raw {
        None => Ok(None),
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Some(c)),
                _ => Err(serialization_error(column, format!("bad suffix '{}'", s))),
            }
        }
    }
}

impl ChangeRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            seq: row.get(0)?,
            id: row.get(1)?,
            document_id: row.get(2)?,
            amendment_id: row.get(3)?,
            version_id: row.get(4)?,
            scope: row.get(5)?,
            chapter_number: row.get(6)?,
            chapter_suffix: row.get(7)?,
            section_number: row.get(8)?,
            section_suffix: row.get(9)?,
            heading: row.get(10)?,
            old_text: row.get(11)?,
            new_text: row.get(12)?,
            change_kind: row.get(13)?,
            effective_date: row.get(14)?,
            digest: row.get(15)?,
            created_at: row.get(16)?,
        })
    }

    fn target(&mut self) -> Result<ChangeTarget> {
        match self.scope.as_str() {
            SCOPE_WHOLE_DOCUMENT => Ok(ChangeTarget::WholeDocument),
            SCOPE_SECTION => {
                let number = self.section_number.ok_or_else(|| {
                    serialization_error("section_number", "missing for section scope")
                })?;
                let section = ProvisionNumber {
                    number,
                    suffix: suffix_from_column("section_suffix", self.section_suffix.take())?,
                };
                let chapter = match self.chapter_number {
                    Some(number) => Some(ProvisionNumber {
                        number,
                        suffix: suffix_from_column("chapter_suffix", self.chapter_suffix.take())?,
                    }),
                    None => None,
                };
                Ok(ChangeTarget::Section(SectionKey::new(chapter, section)))
            }
            other => Err(serialization_error("scope", format!("unknown scope '{}'", other))),
        }
    }

    fn into_model(mut self) -> Result<SectionChange> {
        let target = self.target()?;
        Ok(SectionChange {
            id: self.id,
            seq: self.seq,
            document_id: self.document_id,
            amendment_id: self.amendment_id,
            version_id: self.version_id,
            target,
            kind: self.change_kind.parse::<SectionChangeKind>()?,
            heading: self.heading,
            old_text: self.old_text,
            new_text: self.new_text,
            effective_date: from_date("effective_date", &self.effective_date)?,
            digest: self.digest,
            created_at: from_millis("created_at", self.created_at)?,
        })
    }
}

/// SQLite repository for `section_changes`
pub struct SectionChangeRepo;

impl SectionChangeRepo {
    /// Insert the change unless its digest is already recorded for the
    /// document. Returns the stored row when one was written.
    pub fn insert_if_absent(
        conn: &Connection,
        change: &NewSectionChange<'_>,
    ) -> Result<Option<SectionChange>> {
        let digest = change.draft.digest(change.effective_date, change.version_id);

        let exists = conn
            .query_row(
                "SELECT 1 FROM section_changes WHERE document_id = ?1 AND digest = ?2",
                rusqlite::params![change.document_id, digest],
                |_| Ok(()),
            )
            .optional()
            .map_err(from_rusqlite)?
            .is_some();
        if exists {
            tracing::debug!(
                document_id = %change.document_id,
                section = %change.draft.target.label(),
                "Section change already recorded"
            );
            return Ok(None);
        }

        let (scope, chapter, section) = match change.draft.target {
            ChangeTarget::WholeDocument => (SCOPE_WHOLE_DOCUMENT, None, None),
            ChangeTarget::Section(key) => (SCOPE_SECTION, key.chapter, Some(key.section)),
        };
        let id = new_id();
        let created_at = Utc::now();

        conn.execute(
            "INSERT INTO section_changes (
                id, document_id, amendment_id, version_id, scope, chapter_number,
                chapter_suffix, section_number, section_suffix, heading, old_text, new_text,
                change_kind, effective_date, digest, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            rusqlite::params![
                id,
                change.document_id,
                change.amendment_id,
                change.version_id,
                scope,
                chapter.map(|c| c.number),
                suffix_to_column(chapter.and_then(|c| c.suffix)),
                section.map(|s| s.number),
                suffix_to_column(section.and_then(|s| s.suffix)),
                change.draft.heading,
                change.draft.old_text,
                change.draft.new_text,
                change.draft.kind.as_str(),
                to_date(change.effective_date),
                digest,
                to_millis(created_at),
            ],
        )
        .map_err(from_rusqlite)?;

        let seq = conn.last_insert_rowid();
        tracing::debug!(
            document_id = %change.document_id,
            section = %change.draft.target.label(),
            kind = change.draft.kind.as_str(),
            seq,
            "Recorded section change"
        );

        Ok(Some(SectionChange {
            id,
            seq,
            document_id: change.document_id.to_string(),
            amendment_id: change.amendment_id.map(str::to_string),
            version_id: change.version_id.map(str::to_string),
            target: change.draft.target,
            kind: change.draft.kind,
            heading: change.draft.heading.clone(),
            old_text: change.draft.old_text.clone(),
            new_text: change.draft.new_text.clone(),
            effective_date: change.effective_date,
            digest,
            created_at,
        }))
    }

    /// All changes of a document in replay order
    pub fn list_for_document(conn: &Connection, document_id: &str) -> Result<Vec<SectionChange>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {COLUMNS} FROM section_changes
                 WHERE document_id = ?1 ORDER BY effective_date, seq"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([document_id], ChangeRow::read)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        rows.into_iter().map(ChangeRow::into_model).collect()
    }

    pub fn count_for_document(conn: &Connection, document_id: &str) -> Result<i64> {
        conn.query_row(
            "SELECT COUNT(*) FROM section_changes WHERE document_id = ?1",
            [document_id],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }
}
