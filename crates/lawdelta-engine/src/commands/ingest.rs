//! Per-document update pipeline.
//!
//! ## Pipeline (one transaction per document, in order):
//! 1. Load the stored document; first sight creates it with a `NEW_LAW`
//!    (or `NEW_RULING`) event and no versions
//! 2. Reject a stale `old_full_text` (Concurrency, nothing written)
//! 3. Stop if the text has no substantive change
//! 4. Resolve the amending instrument (explicit hint, else the subtitle)
//! 5. Archive the old text as the next version
//! 6. Classify section changes
//! 7. Resolve the effective date (explicit, transitional provisions, source timestamp)
//! 8. Register the amendment
//! 9. Record section changes and the change event
//! 10. Policy hook check (a denial rolls everything back)
//! 11. Overwrite the document text and commit

use chrono::{DateTime, NaiveDate, Utc};
use lawdelta_core::classify::{classify_changes, Classification};
use lawdelta_core::diff::{compute_diff, generate_unified_diff, has_substantive_changes};
use lawdelta_core::errors::{ExError, LawDeltaError};
use lawdelta_core::model::{
    AffectedSections, ChangeEventKind, ContentType, DocumentStatus, InstrumentNumber,
    LegalDocument,
};
use lawdelta_core::parser::{
    parse_sections, parse_transitional_provisions, section_amendment_markers,
};
use lawdelta_core::policy::{PendingUpdate, UpdatePolicyHook};
use lawdelta_core::registry::{amendment_title, parse_instrument_reference};
use lawdelta_core::{log_op_end, log_op_error, log_op_start};
use lawdelta_store::errors::{from_rusqlite, Result};
use lawdelta_store::repo::{
    archive_version, create_amendment_from_change, dedup_key, AmendmentRecord, ArchiveRequest,
    ChangeEventRepo, DocumentRepo, NewChangeEvent, NewSectionChange, SectionChangeRepo,
};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTEXT_LINES: usize = 3;
pub const DEFAULT_MAX_DIFF_BYTES: usize = 50_000;
const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// One update delivered by the upstream sync job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpdate {
    pub document_number: String,
    pub title: String,
    pub content_type: ContentType,
    /// When present, must equal the stored text
    #[serde(default)]
    pub old_full_text: Option<String>,
    #[serde(default)]
    pub old_markup: Option<String>,
    pub new_full_text: String,
    #[serde(default)]
    pub new_markup: Option<String>,
    /// `SFS 2025:732` or `2025:732`
    #[serde(default)]
    pub amendment_number_hint: Option<String>,
    /// Source subtitle, e.g. `Ändrad: t.o.m. SFS 2025:732`
    #[serde(default)]
    pub subtitle: Option<String>,
    pub source_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub amendment_full_text: Option<String>,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Context lines around each change in the stored unified diff
    pub context_lines: usize,
    /// Stored unified diffs are cut at this many bytes
    pub max_diff_bytes: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            max_diff_bytes: DEFAULT_MAX_DIFF_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    Created,
    Updated,
    Unchanged,
}

/// What one update did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    pub document_number: String,
    pub document_id: String,
    pub status: UpdateStatus,
    /// Number of the archived version, when one was written
    pub version_number: Option<i64>,
    pub amendment_number: Option<String>,
    pub effective_date: Option<NaiveDate>,
    /// Section change rows written by this update
    pub section_changes: usize,
    pub event: Option<ChangeEventKind>,
    /// Classification fell back to a whole-document record
    pub degraded: bool,
}

impl UpdateReport {
    fn bare(doc: &LegalDocument, status: UpdateStatus) -> Self {
        Self {
            document_number: doc.document_number.clone(),
            document_id: doc.id.clone(),
            status,
            version_number: None,
            amendment_number: None,
            effective_date: None,
            section_changes: 0,
            event: None,
            degraded: false,
        }
    }
}

/// Apply one document update in a single transaction.
///
/// ## Errors
///
/// - `InvalidInput`: empty document number or malformed amendment hint
/// - `Concurrency`: `old_full_text` does not match the stored text
/// - `PolicyDenied`: the hook refused the update
/// - `Persistence` / `ConstraintViolation`: database failure
///
/// Nothing is written when an error is returned.
pub fn apply_update(
    conn: &mut Connection,
    update: &DocumentUpdate,
    options: &IngestOptions,
    policy_hook: &dyn UpdatePolicyHook,
) -> Result<UpdateReport> {
    log_op_start!(
        "apply_update",
        document_number = update.document_number.as_str()
    );
    let start = std::time::Instant::now();

    let result = apply_update_impl(conn, update, options, policy_hook).map_err(|e| {
        log_op_error!(
            "apply_update",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            document_number = update.document_number.as_str()
        );
        e
    })?;

    log_op_end!(
        "apply_update",
        duration_ms = start.elapsed().as_millis() as u64,
        document_number = update.document_number.as_str(),
        status = ?result.status,
        section_count = result.section_changes
    );

    Ok(result)
}

fn apply_update_impl(
    conn: &mut Connection,
    update: &DocumentUpdate,
    options: &IngestOptions,
    policy_hook: &dyn UpdatePolicyHook,
) -> Result<UpdateReport> {
    if update.document_number.trim().is_empty() {
        return Err(LawDeltaError::InvalidInput {
            reason: "document number is empty".to_string(),
        }
        .into());
    }
    let instrument = resolve_instrument(update)?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;
    let now = Utc::now();

    let report = match DocumentRepo::find_by_number(&tx, &update.document_number)? {
        None => create_document(&tx, update, policy_hook, now)?,
        Some(doc) => update_document(&tx, doc, update, instrument, options, policy_hook, now)?,
    };

    tx.commit().map_err(from_rusqlite)?;
    Ok(report)
}

fn create_document(
    tx: &Transaction<'_>,
    update: &DocumentUpdate,
    policy_hook: &dyn UpdatePolicyHook,
    now: DateTime<Utc>,
) -> Result<UpdateReport> {
    let classification = classify_changes("", &update.new_full_text, update.content_type, false);
    let kind = classification
        .event
        .unwrap_or_else(|| update.content_type.creation_event());

    let doc = LegalDocument {
        id: uuid::Uuid::now_v7().to_string(),
        document_number: update.document_number.clone(),
        title: update.title.clone(),
        content_type: update.content_type,
        full_text: update.new_full_text.clone(),
        markup: update.new_markup.clone(),
        status: DocumentStatus::Active,
        publication_date: update.publication_date,
        last_change_type: Some(kind),
        last_change_ref: None,
        last_change_at: Some(now),
        created_at: now,
        updated_at: now,
    };
    DocumentRepo::insert(tx, &doc)?;

    let key = dedup_key(kind, None, None, &doc.full_text);
    ChangeEventRepo::insert_if_absent(
        tx,
        &NewChangeEvent {
            document_id: &doc.id,
            content_type: doc.content_type,
            kind,
            amendment_number: None,
            diff_summary: None,
            unified_diff: None,
            changed_sections: &[],
            dedup_key: &key,
            detected_at: now,
        },
    )?;

    policy_hook.check(&PendingUpdate {
        document_number: &doc.document_number,
        event_kind: Some(kind),
        amendment_number: None,
        section_change_count: 0,
    })?;

    Ok(UpdateReport {
        event: Some(kind),
        ..UpdateReport::bare(&doc, UpdateStatus::Created)
    })
}

fn update_document(
    tx: &Transaction<'_>,
    doc: LegalDocument,
    update: &DocumentUpdate,
    instrument: Option<InstrumentNumber>,
    options: &IngestOptions,
    policy_hook: &dyn UpdatePolicyHook,
    now: DateTime<Utc>,
) -> Result<UpdateReport> {
    if let Some(expected) = &update.old_full_text {
        if *expected != doc.full_text {
            return Err(ExError::from(LawDeltaError::StaleUpdate {
                document_number: doc.document_number.clone(),
            })
            .with_op("apply_update"));
        }
    }

    if let Some(date) = update.publication_date {
        DocumentRepo::backfill_publication_date(tx, &doc.id, date)?;
    }

    if !has_substantive_changes(&doc.full_text, &update.new_full_text) {
        tracing::debug!(
            document_number = %doc.document_number,
            "No substantive change"
        );
        return Ok(UpdateReport::bare(&doc, UpdateStatus::Unchanged));
    }

    let amendment_number = instrument.map(|n| n.to_string());

    let version = archive_version(
        tx,
        &ArchiveRequest {
            document_id: &doc.id,
            full_text: &doc.full_text,
            markup: doc.markup.as_deref(),
            amendment_number: amendment_number.as_deref(),
            source_timestamp: update.source_timestamp,
        },
    )?;

    let classification = classify_changes(
        &doc.full_text,
        &update.new_full_text,
        doc.content_type,
        true,
    );
    let effective_date = resolve_effective_date(update, instrument);

    let amendment = match instrument {
        Some(number) => {
            let affected = affected_sections(&classification, &update.new_full_text, number);
            Some(create_amendment_from_change(
                tx,
                &AmendmentRecord {
                    base_document_id: &doc.id,
                    amendment_number: &number.to_string(),
                    title: &amendment_title(&number),
                    full_text: update.amendment_full_text.as_deref(),
                    detected_from_version_id: Some(&version.id),
                    effective_date: Some(effective_date),
                    affected_sections: &affected,
                },
            )?)
        }
        None => None,
    };

    let mut inserted = 0;
    for draft in &classification.changes {
        let stored = SectionChangeRepo::insert_if_absent(
            tx,
            &NewSectionChange {
                document_id: &doc.id,
                amendment_id: amendment.as_ref().map(|a| a.id.as_str()),
                version_id: Some(&version.id),
                draft,
                effective_date,
            },
        )?;
        if stored.is_some() {
            inserted += 1;
        }
    }

    if let Some(kind) = classification.event {
        let diff = compute_diff(&doc.full_text, &update.new_full_text);
        let unified = truncate_diff(
            generate_unified_diff(&doc.full_text, &update.new_full_text, options.context_lines),
            options.max_diff_bytes,
        );
        let labels = classification.changed_section_labels();
        let key = dedup_key(
            kind,
            amendment_number.as_deref(),
            Some(&version.id),
            &update.new_full_text,
        );
        ChangeEventRepo::insert_if_absent(
            tx,
            &NewChangeEvent {
                document_id: &doc.id,
                content_type: doc.content_type,
                kind,
                amendment_number: amendment_number.as_deref(),
                diff_summary: Some(diff.summary.as_str()),
                unified_diff: Some(unified.as_str()),
                changed_sections: &labels,
                dedup_key: &key,
                detected_at: now,
            },
        )?;
        DocumentRepo::record_last_change(tx, &doc.id, kind, amendment_number.as_deref(), now)?;
    }

    policy_hook.check(&PendingUpdate {
        document_number: &doc.document_number,
        event_kind: classification.event,
        amendment_number: amendment_number.as_deref(),
        section_change_count: classification.changes.len(),
    })?;

    DocumentRepo::overwrite_text(
        tx,
        &doc.id,
        &update.title,
        &update.new_full_text,
        update.new_markup.as_deref(),
        now,
    )?;

    Ok(UpdateReport {
        version_number: Some(version.version_number),
        amendment_number,
        effective_date: Some(effective_date),
        section_changes: inserted,
        event: classification.event,
        degraded: classification.degraded,
        ..UpdateReport::bare(&doc, UpdateStatus::Updated)
    })
}

/// The explicit hint wins and must be well formed; the subtitle is a best effort.
fn resolve_instrument(update: &DocumentUpdate) -> Result<Option<InstrumentNumber>> {
    if let Some(hint) = &update.amendment_number_hint {
        return InstrumentNumber::parse(hint).map(Some).ok_or_else(|| {
            LawDeltaError::InvalidInput {
                reason: format!("amendment number '{}' is not YYYY:NNN", hint),
            }
            .into()
        });
    }
    Ok(update
        .subtitle
        .as_deref()
        .and_then(parse_instrument_reference))
}

fn resolve_effective_date(
    update: &DocumentUpdate,
    instrument: Option<InstrumentNumber>,
) -> NaiveDate {
    if let Some(date) = update.effective_date {
        return date;
    }
    let from_provisions = instrument.and_then(|number| {
        [update.amendment_full_text.as_deref(), Some(update.new_full_text.as_str())]
            .into_iter()
            .flatten()
            .find_map(|text| parse_transitional_provisions(text).get(&number).copied())
    });
    from_provisions.unwrap_or_else(|| update.source_timestamp.date_naive())
}

/// Sections the instrument touched. A whole-document fallback says nothing
/// useful, so the trailing `Lag (YYYY:NNN).` markers are read instead.
fn affected_sections(
    classification: &Classification,
    new_text: &str,
    instrument: InstrumentNumber,
) -> AffectedSections {
    if classification.degraded {
        let amended: Vec<String> = section_amendment_markers(&parse_sections(new_text))
            .into_iter()
            .filter(|(_, marker)| *marker == instrument)
            .map(|(key, _)| key.to_string())
            .collect();
        if !amended.is_empty() {
            return AffectedSections {
                amended,
                ..AffectedSections::default()
            };
        }
    }
    AffectedSections::from_drafts(&classification.changes)
}

fn truncate_diff(mut diff: String, max_bytes: usize) -> String {
    if diff.len() <= max_bytes {
        return diff;
    }
    let mut cut = max_bytes;
    while !diff.is_char_boundary(cut) {
        cut -= 1;
    }
    diff.truncate(cut);
    diff.push_str(TRUNCATION_MARKER);
    diff
}

/// Mark a document repealed and emit a `REPEALED` event.
///
/// Repealing an already repealed document is a no-op reported as
/// `Unchanged`.
///
/// ## Errors
///
/// - `NotFound`: unknown document number
/// - `InvalidInput`: malformed `repealed_by`
/// - `PolicyDenied`: the hook refused the repeal
pub fn record_repeal(
    conn: &mut Connection,
    document_number: &str,
    repealed_by: Option<&str>,
    policy_hook: &dyn UpdatePolicyHook,
) -> Result<UpdateReport> {
    log_op_start!("record_repeal", document_number = document_number);
    let start = std::time::Instant::now();

    let result = record_repeal_impl(conn, document_number, repealed_by, policy_hook).map_err(|e| {
        log_op_error!(
            "record_repeal",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            document_number = document_number
        );
        e
    })?;

    log_op_end!(
        "record_repeal",
        duration_ms = start.elapsed().as_millis() as u64,
        document_number = document_number,
        status = ?result.status
    );
    Ok(result)
}

fn record_repeal_impl(
    conn: &mut Connection,
    document_number: &str,
    repealed_by: Option<&str>,
    policy_hook: &dyn UpdatePolicyHook,
) -> Result<UpdateReport> {
    let repealed_by = repealed_by
        .map(|raw| {
            InstrumentNumber::parse(raw)
                .map(|n| n.to_string())
                .ok_or_else(|| LawDeltaError::InvalidInput {
                    reason: format!("repealing instrument '{}' is not YYYY:NNN", raw),
                })
        })
        .transpose()?;

    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(from_rusqlite)?;
    let doc = DocumentRepo::require_by_number(&tx, document_number)?;
    if doc.status == DocumentStatus::Repealed {
        return Ok(UpdateReport::bare(&doc, UpdateStatus::Unchanged));
    }

    let now = Utc::now();
    let kind = ChangeEventKind::Repealed;
    DocumentRepo::set_status(&tx, &doc.id, DocumentStatus::Repealed, now)?;

    let key = dedup_key(kind, repealed_by.as_deref(), None, &doc.full_text);
    ChangeEventRepo::insert_if_absent(
        &tx,
        &NewChangeEvent {
            document_id: &doc.id,
            content_type: doc.content_type,
            kind,
            amendment_number: repealed_by.as_deref(),
            diff_summary: None,
            unified_diff: None,
            changed_sections: &[],
            dedup_key: &key,
            detected_at: now,
        },
    )?;
    DocumentRepo::record_last_change(&tx, &doc.id, kind, repealed_by.as_deref(), now)?;

    policy_hook.check(&PendingUpdate {
        document_number: &doc.document_number,
        event_kind: Some(kind),
        amendment_number: repealed_by.as_deref(),
        section_change_count: 0,
    })?;

    tx.commit().map_err(from_rusqlite)?;

    Ok(UpdateReport {
        amendment_number: repealed_by,
        event: Some(kind),
        ..UpdateReport::bare(&doc, UpdateStatus::Updated)
    })
}
