//! Section-aware parsing of statute text
//!
//! The parser never fails. When it cannot split a document reliably it
//! returns one synthetic whole-document section and says so through
//! [`ParseConfidence`](crate::model::ParseConfidence).

pub mod markers;
pub mod sections;
pub mod transitional;

pub use markers::section_amendment_markers;
pub use sections::{parse_sections, section_map, SectionMap};
pub use transitional::parse_transitional_provisions;
