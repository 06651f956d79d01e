//! Point-in-time read paths
//!
//! `history`, `version_at` and `diff_between` never write. Each loads the
//! document, its archived versions, its section change ledger and its
//! amendments, then hands them to the reconstructor.

use std::collections::{BTreeSet, HashMap};

use chrono::{NaiveDate, Utc};
use lawdelta_core::classify::{classify_section_maps, render_sections};
use lawdelta_core::diff::{compare_words, compute_diff, WordChunk};
use lawdelta_core::model::{
    AmendmentDocument, ChangeTarget, DocumentVersion, LegalDocument, SectionChange,
    SectionChangeKind, SectionKey,
};
use lawdelta_core::reconstruct::{
    reconstruct_as_of, Reconstruction, ReconstructionInput, ReconstructionSource, ReplayAnomaly,
};
use lawdelta_core::{log_op_end, log_op_error, log_op_start};
use lawdelta_store::errors::Result;
use lawdelta_store::repo::{AmendmentRepo, DocumentRepo, SectionChangeRepo, VersionRepo};
use rusqlite::Connection;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Read shapes
// ---------------------------------------------------------------------------

/// One amending instrument on the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendmentTimelineEntry {
    pub amendment_number: String,
    pub title: String,
    pub effective_date: Option<NaiveDate>,
    pub sections_added: usize,
    pub sections_modified: usize,
    pub sections_repealed: usize,
}

impl From<&AmendmentDocument> for AmendmentTimelineEntry {
    fn from(a: &AmendmentDocument) -> Self {
        Self {
            amendment_number: a.amendment_number.clone(),
            title: a.title.clone(),
            effective_date: a.effective_date,
            sections_added: a.affected_sections.added.len(),
            sections_modified: a.affected_sections.amended.len(),
            sections_repealed: a.affected_sections.repealed.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LawHistory {
    pub base_law_number: String,
    pub title: String,
    /// Chronological; undated amendments last
    pub amendments: Vec<AmendmentTimelineEntry>,
    /// Dates on which the text is known to have changed, ascending
    pub available_version_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSection {
    /// See [`SectionKey::sort_key`]
    pub sort_key: String,
    pub chapter: Option<String>,
    pub section: String,
    pub heading: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LawVersion {
    pub base_law_number: String,
    pub as_of_date: NaiveDate,
    pub title: String,
    pub sections: Vec<VersionSection>,
    /// Amendment numbers in application order
    pub applied_amendments: Vec<String>,
    pub predates_history: bool,
    pub source: ReconstructionSource,
    pub anomalies: Vec<ReplayAnomaly>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDiff {
    pub change_type: SectionChangeKind,
    pub sort_key: String,
    pub chapter: Option<String>,
    pub section: String,
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_text: Option<String>,
    /// Only for modified sections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_diff: Option<Vec<WordChunk>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub sections_added: usize,
    pub sections_removed: usize,
    pub sections_modified: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LawDiff {
    pub base_law_number: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub sections: Vec<SectionDiff>,
    pub summary: DiffSummary,
    /// Amendments in force at `to` but not at `from`
    pub amendments_between: Vec<String>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

struct DocumentHistory {
    doc: LegalDocument,
    versions: Vec<DocumentVersion>,
    changes: Vec<SectionChange>,
    amendments: Vec<AmendmentDocument>,
}

impl DocumentHistory {
    fn load(conn: &Connection, document_number: &str) -> Result<Self> {
        let doc = DocumentRepo::require_by_number(conn, document_number)?;
        let versions = VersionRepo::list_for_document(conn, &doc.id)?;
        let changes = SectionChangeRepo::list_for_document(conn, &doc.id)?;
        let amendments = AmendmentRepo::list_for_base(conn, &doc.id)?;
        Ok(Self {
            doc,
            versions,
            changes,
            amendments,
        })
    }

    fn reconstruct(&self, target: NaiveDate, today: NaiveDate) -> Reconstruction {
        let input = ReconstructionInput {
            current_text: &self.doc.full_text,
            versions: &self.versions,
            changes: &self.changes,
            history_start: self.doc.publication_date,
        };
        reconstruct_as_of(&input, target, today)
    }

    fn amendment_numbers(&self, ids: &[String]) -> Vec<String> {
        let by_id: HashMap<&str, &str> = self
            .amendments
            .iter()
            .map(|a| (a.id.as_str(), a.amendment_number.as_str()))
            .collect();
        ids.iter()
            .filter_map(|id| by_id.get(id.as_str()).map(|n| n.to_string()))
            .collect()
    }
}

fn labels(key: &SectionKey) -> (Option<String>, String) {
    if key.is_whole_document() {
        (None, key.to_string())
    } else {
        (key.chapter_label(), key.section_label())
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

/// Amendment timeline of a base law.
///
/// # Errors
///
/// `NotFound` for an unknown document number.
pub fn history(conn: &Connection, document_number: &str) -> Result<LawHistory> {
    log_op_start!("history", document_number = document_number);
    let start = std::time::Instant::now();

    let result = history_impl(conn, document_number).map_err(|e| {
        log_op_error!(
            "history",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            document_number = document_number
        );
        e
    })?;

    log_op_end!(
        "history",
        duration_ms = start.elapsed().as_millis() as u64,
        document_number = document_number,
        amendment_count = result.amendments.len()
    );
    Ok(result)
}

fn history_impl(conn: &Connection, document_number: &str) -> Result<LawHistory> {
    let loaded = DocumentHistory::load(conn, document_number)?;

    let mut dates: BTreeSet<NaiveDate> = loaded.changes.iter().map(|c| c.effective_date).collect();
    if let Some(published) = loaded.doc.publication_date {
        dates.insert(published);
    }

    Ok(LawHistory {
        base_law_number: loaded.doc.document_number.clone(),
        title: loaded.doc.title.clone(),
        amendments: loaded.amendments.iter().map(Into::into).collect(),
        available_version_dates: dates.into_iter().collect(),
    })
}

// ---------------------------------------------------------------------------
// version_at
// ---------------------------------------------------------------------------

/// The document as it read on `date`.
///
/// # Errors
///
/// `NotFound` for an unknown document number.
pub fn version_at(conn: &Connection, document_number: &str, date: NaiveDate) -> Result<LawVersion> {
    version_at_on(conn, document_number, date, today())
}

/// [`version_at`] with an explicit "today".
///
/// # Errors
///
/// `NotFound` for an unknown document number.
pub fn version_at_on(
    conn: &Connection,
    document_number: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<LawVersion> {
    log_op_start!(
        "version_at",
        document_number = document_number,
        target_date = %date
    );
    let start = std::time::Instant::now();

    let result = version_at_impl(conn, document_number, date, today).map_err(|e| {
        log_op_error!(
            "version_at",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            document_number = document_number
        );
        e
    })?;

    log_op_end!(
        "version_at",
        duration_ms = start.elapsed().as_millis() as u64,
        document_number = document_number,
        section_count = result.sections.len()
    );
    Ok(result)
}

fn version_at_impl(
    conn: &Connection,
    document_number: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<LawVersion> {
    let loaded = DocumentHistory::load(conn, document_number)?;
    let rebuilt = loaded.reconstruct(date, today);

    let sections = rebuilt
        .sections
        .iter()
        .map(|s| {
            let (chapter, section) = labels(&s.key);
            VersionSection {
                sort_key: s.key.sort_key(),
                chapter,
                section,
                heading: s.heading.clone(),
                text: s.body.clone(),
            }
        })
        .collect();

    Ok(LawVersion {
        base_law_number: loaded.doc.document_number.clone(),
        as_of_date: date,
        title: loaded.doc.title.clone(),
        sections,
        applied_amendments: loaded.amendment_numbers(&rebuilt.applied_amendment_ids),
        predates_history: rebuilt.predates_history,
        source: rebuilt.source,
        anomalies: rebuilt.anomalies,
    })
}

// ---------------------------------------------------------------------------
// diff_between
// ---------------------------------------------------------------------------

/// Section-level differences between the document as of `from` and `to`.
///
/// Dates given in reverse order are swapped.
///
/// # Errors
///
/// `NotFound` for an unknown document number.
pub fn diff_between(
    conn: &Connection,
    document_number: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<LawDiff> {
    diff_between_on(conn, document_number, from, to, today())
}

/// [`diff_between`] with an explicit "today".
///
/// # Errors
///
/// `NotFound` for an unknown document number.
pub fn diff_between_on(
    conn: &Connection,
    document_number: &str,
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Result<LawDiff> {
    log_op_start!(
        "diff_between",
        document_number = document_number,
        from = %from,
        to = %to
    );
    let start = std::time::Instant::now();

    let result = diff_between_impl(conn, document_number, from, to, today).map_err(|e| {
        log_op_error!(
            "diff_between",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            document_number = document_number
        );
        e
    })?;

    log_op_end!(
        "diff_between",
        duration_ms = start.elapsed().as_millis() as u64,
        document_number = document_number,
        section_count = result.sections.len()
    );
    Ok(result)
}

fn diff_between_impl(
    conn: &Connection,
    document_number: &str,
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Result<LawDiff> {
    let (from, to) = if from <= to { (from, to) } else { (to, from) };

    let loaded = DocumentHistory::load(conn, document_number)?;
    let before = loaded.reconstruct(from, today);
    let after = loaded.reconstruct(to, today);
    let before_map = before.section_map();
    let after_map = after.section_map();

    let mut summary = DiffSummary::default();
    let sections: Vec<SectionDiff> = classify_section_maps(&before_map, &after_map)
        .into_iter()
        .map(|draft| {
            match draft.kind {
                SectionChangeKind::Added => summary.sections_added += 1,
                SectionChangeKind::Repealed => summary.sections_removed += 1,
                SectionChangeKind::Modified => summary.sections_modified += 1,
            }
            let key = match draft.target {
                ChangeTarget::Section(key) => key,
                ChangeTarget::WholeDocument => SectionKey::whole_document(),
            };
            let (chapter, section) = labels(&key);
            let word_diff = match (&draft.kind, &draft.old_text, &draft.new_text) {
                (SectionChangeKind::Modified, Some(old), Some(new)) => {
                    Some(compare_words(old, new))
                }
                _ => None,
            };
            SectionDiff {
                change_type: draft.kind,
                sort_key: key.sort_key(),
                chapter,
                section,
                heading: draft.heading,
                old_text: draft.old_text,
                new_text: draft.new_text,
                word_diff,
            }
        })
        .collect();

    let lines = compute_diff(&render_sections(&before_map), &render_sections(&after_map));
    summary.lines_added = lines.added_lines;
    summary.lines_removed = lines.removed_lines;

    let newly_applied: Vec<String> = after
        .applied_amendment_ids
        .iter()
        .filter(|id| !before.applied_amendment_ids.contains(id))
        .cloned()
        .collect();

    Ok(LawDiff {
        base_law_number: loaded.doc.document_number.clone(),
        from,
        to,
        sections,
        summary,
        amendments_between: loaded.amendment_numbers(&newly_applied),
    })
}
