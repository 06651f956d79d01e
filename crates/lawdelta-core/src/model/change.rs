//! Change records produced by classification and stored in the ledger

use crate::errors::LawDeltaError;
use crate::model::{unknown, ContentType, SectionKey};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionChangeKind {
    Added,
    Modified,
    Repealed,
}

impl SectionChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionChangeKind::Added => "ADDED",
            SectionChangeKind::Modified => "MODIFIED",
            SectionChangeKind::Repealed => "REPEALED",
        }
    }
}

impl FromStr for SectionChangeKind {
    type Err = LawDeltaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADDED" => Ok(SectionChangeKind::Added),
            "MODIFIED" => Ok(SectionChangeKind::Modified),
            "REPEALED" => Ok(SectionChangeKind::Repealed),
            other => Err(unknown("change_kind", other)),
        }
    }
}

/// What a section change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "key", rename_all = "snake_case")]
pub enum ChangeTarget {
    Section(SectionKey),
    /// The parser could not split one side; the change replaces the whole text
    WholeDocument,
}

impl ChangeTarget {
    pub fn label(&self) -> String {
        match self {
            ChangeTarget::Section(key) => key.to_string(),
            ChangeTarget::WholeDocument => SectionKey::whole_document().to_string(),
        }
    }
}

/// Classifier output for one affected section, before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionChangeDraft {
    pub target: ChangeTarget,
    pub kind: SectionChangeKind,
    pub heading: Option<String>,
    /// Absent for `Added`
    pub old_text: Option<String>,
    /// Absent for `Repealed`
    pub new_text: Option<String>,
}

impl SectionChangeDraft {
    /// Content digest used as the ledger's idempotency key
    ///
    /// Covers the archived version the change was classified against, so a
    /// retried write of one update collapses to one row while a later update
    /// with the same delta is kept.
    pub fn digest(&self, effective_date: NaiveDate, version_id: Option<&str>) -> String {
        let mut hasher = Sha256::new();
        hasher.update(version_id.unwrap_or_default().as_bytes());
        hasher.update([0]);
        hasher.update(self.target.label().as_bytes());
        hasher.update([0]);
        hasher.update(self.kind.as_str().as_bytes());
        hasher.update([0]);
        hasher.update(effective_date.to_string().as_bytes());
        for text in [&self.old_text, &self.new_text] {
            hasher.update([0]);
            match text {
                Some(t) => {
                    hasher.update([1]);
                    hasher.update(t.as_bytes());
                }
                None => hasher.update([2]),
            }
        }
        hex::encode(hasher.finalize())
    }
}

/// A stored section change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionChange {
    pub id: String,
    /// Insertion order; breaks ties between changes with the same effective date
    pub seq: i64,
    pub document_id: String,
    pub amendment_id: Option<String>,
    pub version_id: Option<String>,
    pub target: ChangeTarget,
    pub kind: SectionChangeKind,
    pub heading: Option<String>,
    pub old_text: Option<String>,
    pub new_text: Option<String>,
    pub effective_date: NaiveDate,
    pub digest: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeEventKind {
    NewLaw,
    AmendmentDetected,
    Repealed,
    NewRuling,
}

impl ChangeEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeEventKind::NewLaw => "NEW_LAW",
            ChangeEventKind::AmendmentDetected => "AMENDMENT_DETECTED",
            ChangeEventKind::Repealed => "REPEALED",
            ChangeEventKind::NewRuling => "NEW_RULING",
        }
    }
}

impl FromStr for ChangeEventKind {
    type Err = LawDeltaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW_LAW" => Ok(ChangeEventKind::NewLaw),
            "AMENDMENT_DETECTED" => Ok(ChangeEventKind::AmendmentDetected),
            "REPEALED" => Ok(ChangeEventKind::Repealed),
            "NEW_RULING" => Ok(ChangeEventKind::NewRuling),
            other => Err(unknown("change_type", other)),
        }
    }
}

/// Append-only notification trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub id: String,
    pub document_id: String,
    pub content_type: ContentType,
    pub kind: ChangeEventKind,
    pub amendment_number: Option<String>,
    pub diff_summary: Option<String>,
    pub unified_diff: Option<String>,
    /// Section labels such as `3 kap. 7 a §`
    pub changed_sections: Vec<String>,
    pub dedup_key: String,
    pub detected_at: DateTime<Utc>,
}

/// Labels of the sections an amending instrument touched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedSections {
    pub added: Vec<String>,
    pub amended: Vec<String>,
    pub repealed: Vec<String>,
}

impl AffectedSections {
    pub fn from_drafts(drafts: &[SectionChangeDraft]) -> Self {
        let mut out = Self::default();
        for d in drafts {
            let label = d.target.label();
            match d.kind {
                SectionChangeKind::Added => out.added.push(label),
                SectionChangeKind::Modified => out.amended.push(label),
                SectionChangeKind::Repealed => out.repealed.push(label),
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.amended.is_empty() && self.repealed.is_empty()
    }
}

/// A separate instrument that amends a base document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendmentDocument {
    pub id: String,
    /// The amending instrument's own number, e.g. `SFS 2025:732`
    pub amendment_number: String,
    pub base_document_id: String,
    /// `Lag (2025:732)`
    pub title: String,
    pub full_text: Option<String>,
    pub detected_from_version_id: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub affected_sections: AffectedSections,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(old: Option<&str>, new: Option<&str>, kind: SectionChangeKind) -> SectionChangeDraft {
        SectionChangeDraft {
            target: ChangeTarget::Section(SectionKey::plain(1)),
            kind,
            heading: None,
            old_text: old.map(String::from),
            new_text: new.map(String::from),
        }
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let a = draft(Some("A"), Some("A2"), SectionChangeKind::Modified);
        assert_eq!(a.digest(date, Some("v1")), a.clone().digest(date, Some("v1")));

        let b = draft(Some("A"), Some("A3"), SectionChangeKind::Modified);
        assert_ne!(a.digest(date, Some("v1")), b.digest(date, Some("v1")));

        let later = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_ne!(a.digest(date, Some("v1")), a.digest(later, Some("v1")));
    }

    #[test]
    fn test_digest_separates_versions() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let a = draft(Some("A"), Some("B"), SectionChangeKind::Modified);
        assert_ne!(a.digest(date, Some("v1")), a.digest(date, Some("v3")));
        assert_ne!(a.digest(date, None), a.digest(date, Some("v1")));
    }

    #[test]
    fn test_digest_distinguishes_absent_from_empty() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let added = draft(None, Some("x"), SectionChangeKind::Added);
        let mut empty_old = added.clone();
        empty_old.old_text = Some(String::new());
        assert_ne!(added.digest(date, None), empty_old.digest(date, None));
    }

    #[test]
    fn test_affected_sections_buckets() {
        let drafts = vec![
            draft(Some("A"), Some("B"), SectionChangeKind::Modified),
            draft(None, Some("C"), SectionChangeKind::Added),
        ];
        let affected = AffectedSections::from_drafts(&drafts);
        assert_eq!(affected.amended, vec!["1 §"]);
        assert_eq!(affected.added, vec!["1 §"]);
        assert!(affected.repealed.is_empty());
    }
}
