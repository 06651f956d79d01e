//! Amending-instrument references
//!
//! The store's amendment registry keys amendments by the numbers extracted
//! here.

use crate::model::InstrumentNumber;
use regex::Regex;
use std::sync::LazyLock;

/// `t.o.m. SFS 2025:732`
static THROUGH_AMENDMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)t\.\s*o\.\s*m\.\s*SFS\s*(\d{4}):(\d+)").expect("valid regex")
});

/// `Lag (2025:732)`, `Förordning (1998:123)`
static TYPED_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\p{L}+)\s*\((\d{4}):(\d+)\)").expect("valid regex")
});

fn instrument(year: &str, number: &str) -> Option<InstrumentNumber> {
    Some(InstrumentNumber::new(year.parse().ok()?, number.parse().ok()?))
}

/// Extract the amending instrument named by a document subtitle.
///
/// The through-amendment form wins over typed references; among typed
/// references the last one is taken, as subtitles list instruments oldest
/// first.
pub fn parse_instrument_reference(subtitle: &str) -> Option<InstrumentNumber> {
    if let Some(caps) = THROUGH_AMENDMENT.captures(subtitle) {
        return instrument(&caps[1], &caps[2]);
    }
    TYPED_REFERENCE
        .captures_iter(subtitle)
        .filter_map(|caps| instrument(&caps[2], &caps[3]))
        .last()
}

/// Title of an amending law, `Lag (2025:732)`
pub fn amendment_title(number: &InstrumentNumber) -> String {
    format!("Lag ({})", number.bare())
}
