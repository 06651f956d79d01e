//! Section-level change classification
//!
//! Turns two texts (or two section maps) into [`SectionChangeDraft`]s plus at
//! most one document-level event kind. Pure and infallible.

use crate::diff::has_substantive_changes;
use crate::model::{
    ChangeEventKind, ChangeTarget, ContentType, ParseConfidence, ParsedSection,
    SectionChangeDraft, SectionChangeKind, SectionKey,
};
use crate::parser::{parse_sections, section_map, SectionMap};

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// In section display order
    pub changes: Vec<SectionChangeDraft>,
    pub event: Option<ChangeEventKind>,
    /// One side could not be split, so the result is a whole-document record
    pub degraded: bool,
    pub old_confidence: ParseConfidence,
    pub new_confidence: ParseConfidence,
}

impl Classification {
    /// Labels of every touched section, for event payloads
    pub fn changed_section_labels(&self) -> Vec<String> {
        self.changes.iter().map(|c| c.target.label()).collect()
    }
}

/// Classify an update of a document from `old_text` to `new_text`.
///
/// `prior_exists` is false on the first ingestion of a document; that case
/// yields no section records and a creation event (`NEW_LAW`, or
/// `NEW_RULING` for court content).
pub fn classify_changes(
    old_text: &str,
    new_text: &str,
    content_type: ContentType,
    prior_exists: bool,
) -> Classification {
    let old = parse_sections(old_text);
    let new = parse_sections(new_text);

    let mut out = Classification {
        changes: Vec::new(),
        event: None,
        degraded: false,
        old_confidence: old.confidence,
        new_confidence: new.confidence,
    };

    if !prior_exists {
        out.event = Some(content_type.creation_event());
        return out;
    }

    if old.confidence.is_single_section() || new.confidence.is_single_section() {
        out.degraded = true;
        out.changes = whole_document_change(old_text, new_text).into_iter().collect();
    } else {
        out.changes = diff_maps(&section_map(&old), &section_map(&new));
    }

    if !out.changes.is_empty() {
        out.event = Some(ChangeEventKind::AmendmentDetected);
    }
    out
}

/// Classify two already-built section maps, e.g. two reconstructions.
pub fn classify_section_maps(old: &SectionMap, new: &SectionMap) -> Vec<SectionChangeDraft> {
    if is_unsplit(old) || is_unsplit(new) {
        return whole_document_change(&render_sections(old), &render_sections(new))
            .into_iter()
            .collect();
    }
    diff_maps(old, new)
}

fn is_unsplit(map: &SectionMap) -> bool {
    map.keys().any(SectionKey::is_whole_document)
}

fn whole_document_change(old_text: &str, new_text: &str) -> Option<SectionChangeDraft> {
    has_substantive_changes(old_text, new_text).then(|| SectionChangeDraft {
        target: ChangeTarget::WholeDocument,
        kind: SectionChangeKind::Modified,
        heading: None,
        old_text: Some(old_text.to_string()),
        new_text: Some(new_text.to_string()),
    })
}

fn diff_maps(old: &SectionMap, new: &SectionMap) -> Vec<SectionChangeDraft> {
    let mut keys: Vec<&SectionKey> = old.keys().chain(new.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .filter_map(|key| match (old.get(key), new.get(key)) {
            (None, Some(added)) => Some(draft(*key, SectionChangeKind::Added, None, Some(added))),
            (Some(gone), None) => Some(draft(*key, SectionChangeKind::Repealed, Some(gone), None)),
            (Some(before), Some(after)) if before.differs_from(after) => Some(draft(
                *key,
                SectionChangeKind::Modified,
                Some(before),
                Some(after),
            )),
            _ => None,
        })
        .collect()
}

fn draft(
    key: SectionKey,
    kind: SectionChangeKind,
    old: Option<&ParsedSection>,
    new: Option<&ParsedSection>,
) -> SectionChangeDraft {
    SectionChangeDraft {
        target: ChangeTarget::Section(key),
        kind,
        // a repeal keeps the heading it had; otherwise the new one applies
        heading: match new {
            Some(s) => s.heading.clone(),
            None => old.and_then(|s| s.heading.clone()),
        },
        old_text: old.map(|s| s.body.clone()),
        new_text: new.map(|s| s.body.clone()),
    }
}

/// Render a section map back to plain text, one section per paragraph
pub fn render_sections(map: &SectionMap) -> String {
    map.values()
        .map(|s| {
            if s.key.is_whole_document() {
                s.body.clone()
            } else {
                format!("{} {}", s.key, s.body)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
