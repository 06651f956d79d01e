use crate::errors::LawDeltaError;
use crate::model::{unknown, ChangeEventKind};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of source material a document holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    SfsLaw,
    SfsAmendment,
    AgencyRegulation,
    EuRegulation,
    EuDirective,
    CourtCaseAd,
    CourtCaseHd,
    CourtCaseHovr,
    CourtCaseHfd,
    CourtCaseMod,
    CourtCaseMig,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::SfsLaw => "SFS_LAW",
            ContentType::SfsAmendment => "SFS_AMENDMENT",
            ContentType::AgencyRegulation => "AGENCY_REGULATION",
            ContentType::EuRegulation => "EU_REGULATION",
            ContentType::EuDirective => "EU_DIRECTIVE",
            ContentType::CourtCaseAd => "COURT_CASE_AD",
            ContentType::CourtCaseHd => "COURT_CASE_HD",
            ContentType::CourtCaseHovr => "COURT_CASE_HOVR",
            ContentType::CourtCaseHfd => "COURT_CASE_HFD",
            ContentType::CourtCaseMod => "COURT_CASE_MOD",
            ContentType::CourtCaseMig => "COURT_CASE_MIG",
        }
    }

    /// Court rulings announce themselves as `NEW_RULING` rather than `NEW_LAW`
    pub fn is_court_ruling(&self) -> bool {
        matches!(
            self,
            ContentType::CourtCaseAd
                | ContentType::CourtCaseHd
                | ContentType::CourtCaseHovr
                | ContentType::CourtCaseHfd
                | ContentType::CourtCaseMod
                | ContentType::CourtCaseMig
        )
    }

    /// Event kind for the first ingestion of a document of this type
    pub fn creation_event(&self) -> ChangeEventKind {
        if self.is_court_ruling() {
            ChangeEventKind::NewRuling
        } else {
            ChangeEventKind::NewLaw
        }
    }
}

impl FromStr for ContentType {
    type Err = LawDeltaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SFS_LAW" => ContentType::SfsLaw,
            "SFS_AMENDMENT" => ContentType::SfsAmendment,
            "AGENCY_REGULATION" => ContentType::AgencyRegulation,
            "EU_REGULATION" => ContentType::EuRegulation,
            "EU_DIRECTIVE" => ContentType::EuDirective,
            "COURT_CASE_AD" => ContentType::CourtCaseAd,
            "COURT_CASE_HD" => ContentType::CourtCaseHd,
            "COURT_CASE_HOVR" => ContentType::CourtCaseHovr,
            "COURT_CASE_HFD" => ContentType::CourtCaseHfd,
            "COURT_CASE_MOD" => ContentType::CourtCaseMod,
            "COURT_CASE_MIG" => ContentType::CourtCaseMig,
            other => return Err(unknown("content_type", other)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Active,
    Repealed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Active => "ACTIVE",
            DocumentStatus::Repealed => "REPEALED",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = LawDeltaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(DocumentStatus::Active),
            "REPEALED" => Ok(DocumentStatus::Repealed),
            other => Err(unknown("status", other)),
        }
    }
}

/// Current state of one statutory instrument
///
/// `full_text` is overwritten on every substantive sync; the previous text is
/// archived as a [`DocumentVersion`] in the same transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalDocument {
    pub id: String,
    /// Stable external number, e.g. `SFS 1977:1160`
    pub document_number: String,
    pub title: String,
    pub content_type: ContentType,
    pub full_text: String,
    pub markup: Option<String>,
    pub status: DocumentStatus,
    pub publication_date: Option<NaiveDate>,
    pub last_change_type: Option<ChangeEventKind>,
    pub last_change_ref: Option<String>,
    pub last_change_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable snapshot of a document's text taken just before an overwrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    pub id: String,
    pub document_id: String,
    /// 1-based and gapless per document
    pub version_number: i64,
    pub full_text: String,
    pub markup: Option<String>,
    /// Instrument whose arrival caused the overwrite, if known
    pub amendment_number: Option<String>,
    pub source_timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
