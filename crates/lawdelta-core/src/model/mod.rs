//! Domain model
//!
//! Plain data shared by the pure transforms and the store. Enums that are
//! persisted as text expose `as_str()` and a `FromStr` impl with the same
//! spelling.

pub mod change;
pub mod document;
pub mod instrument;
pub mod section;

pub use change::{
    AffectedSections, AmendmentDocument, ChangeEvent, ChangeEventKind, ChangeTarget,
    SectionChange, SectionChangeDraft, SectionChangeKind,
};
pub use document::{ContentType, DocumentStatus, DocumentVersion, LegalDocument};
pub use instrument::InstrumentNumber;
pub use section::{
    ChapterHeading, ParseConfidence, ParseMode, ParsedDocument, ParsedSection, ProvisionNumber,
    SectionKey,
};

use crate::errors::LawDeltaError;

pub(crate) fn unknown(field: &str, value: &str) -> LawDeltaError {
    LawDeltaError::UnknownEnumValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
