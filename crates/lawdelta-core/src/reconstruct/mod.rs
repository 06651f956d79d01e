//! Point-in-time reconstruction by replaying section changes
//!
//! The earliest archived version is the seed. Every recorded change whose
//! effective date is on or before the target is applied in
//! `(effective_date, seq)` order. For targets on or after `today` the result
//! must equal the live document; when replay disagrees, the live parse wins
//! and the disagreement is reported.

use crate::model::{
    ChangeTarget, DocumentVersion, ParsedSection, SectionChange, SectionChangeKind, SectionKey,
};
use crate::parser::{parse_sections, section_map, SectionMap};
use chrono::NaiveDate;
use serde::Serialize;

/// Everything replay needs for one document
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionInput<'a> {
    pub current_text: &'a str,
    /// Any order
    pub versions: &'a [DocumentVersion],
    /// Any order
    pub changes: &'a [SectionChange],
    /// Earliest date the history is known to cover (publication date)
    pub history_start: Option<NaiveDate>,
}

/// A change that could not be applied as recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayAnomaly {
    pub change_id: String,
    pub section: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconstructionSource {
    Replay,
    /// Target is today or later and replay disagreed with the live text
    LiveDocument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconstruction {
    pub as_of: NaiveDate,
    /// Ordered by chapter, number, suffix
    pub sections: Vec<ParsedSection>,
    /// Ids of amendments whose changes were applied, in application order
    pub applied_amendment_ids: Vec<String>,
    /// Ids of every applied change, in application order
    pub applied_change_ids: Vec<String>,
    pub predates_history: bool,
    pub source: ReconstructionSource,
    pub anomalies: Vec<ReplayAnomaly>,
}

impl Reconstruction {
    pub fn section_map(&self) -> SectionMap {
        self.sections.iter().map(|s| (s.key, s.clone())).collect()
    }
}

/// Changes in replay order
pub fn replay_order(changes: &[SectionChange]) -> Vec<&SectionChange> {
    let mut ordered: Vec<&SectionChange> = changes.iter().collect();
    ordered.sort_by_key(|c| (c.effective_date, c.seq));
    ordered
}

/// Earliest date covered by the input: the supplied history start, else the
/// first change's effective date.
pub fn history_start(input: &ReconstructionInput<'_>) -> Option<NaiveDate> {
    input
        .history_start
        .or_else(|| input.changes.iter().map(|c| c.effective_date).min())
}

fn seed(input: &ReconstructionInput<'_>) -> SectionMap {
    let text = input
        .versions
        .iter()
        .min_by_key(|v| v.version_number)
        .map(|v| v.full_text.as_str())
        .unwrap_or(input.current_text);
    section_map(&parse_sections(text))
}

struct Replay {
    map: SectionMap,
    amendments: Vec<String>,
    applied: Vec<String>,
    anomalies: Vec<ReplayAnomaly>,
}

impl Replay {
    fn note(&mut self, change: &SectionChange, reason: &str) {
        self.anomalies.push(ReplayAnomaly {
            change_id: change.id.clone(),
            section: change.target.label(),
            reason: reason.to_string(),
        });
    }

    fn apply(&mut self, change: &SectionChange) {
        match change.target {
            ChangeTarget::WholeDocument => {
                let text = change.new_text.as_deref().unwrap_or_default();
                self.map = section_map(&parse_sections(text));
            }
            ChangeTarget::Section(key) => self.apply_to_section(key, change),
        }
        self.applied.push(change.id.clone());
        if let Some(amendment_id) = &change.amendment_id {
            if !self.amendments.contains(amendment_id) {
                self.amendments.push(amendment_id.clone());
            }
        }
    }

    fn apply_to_section(&mut self, key: SectionKey, change: &SectionChange) {
        let body = change.new_text.clone().unwrap_or_default();
        match change.kind {
            SectionChangeKind::Repealed => {
                if self.map.remove(&key).is_none() {
                    self.note(change, "repealed section was not present");
                }
            }
            SectionChangeKind::Added | SectionChangeKind::Modified => {
                let exists = self.map.contains_key(&key);
                if change.kind == SectionChangeKind::Added && exists {
                    self.note(change, "added section already present; replaced");
                }
                if change.kind == SectionChangeKind::Modified && !exists {
                    self.note(change, "modified section was not present; inserted");
                }
                self.map.insert(
                    key,
                    ParsedSection {
                        key,
                        heading: change.heading.clone(),
                        body,
                    },
                );
            }
        }
    }
}

fn same_sections(a: &SectionMap, b: &SectionMap) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b.iter())
            .all(|((ka, sa), (kb, sb))| ka == kb && !sa.differs_from(sb))
}

/// Reconstruct the document's sections as they read on `target`.
pub fn reconstruct_as_of(
    input: &ReconstructionInput<'_>,
    target: NaiveDate,
    today: NaiveDate,
) -> Reconstruction {
    let live_view = target >= today;
    let mut replay = Replay {
        map: seed(input),
        amendments: Vec::new(),
        applied: Vec::new(),
        anomalies: Vec::new(),
    };

    for change in replay_order(input.changes) {
        if live_view || change.effective_date <= target {
            replay.apply(change);
        }
    }

    let mut source = ReconstructionSource::Replay;
    if live_view {
        let live = section_map(&parse_sections(input.current_text));
        if !same_sections(&replay.map, &live) {
            tracing::debug!(
                target_date = %target,
                replayed = replay.map.len(),
                live = live.len(),
                "replay diverged from live document, using live text"
            );
            replay.map = live;
            source = ReconstructionSource::LiveDocument;
        }
    }

    let predates_history = history_start(input).is_some_and(|start| target < start);

    Reconstruction {
        as_of: target,
        sections: replay.map.into_values().collect(),
        applied_amendment_ids: replay.amendments,
        applied_change_ids: replay.applied,
        predates_history,
        source,
        anomalies: replay.anomalies,
    }
}
