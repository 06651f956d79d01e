//! Trailing amendment markers on individual sections
//!
//! Consolidated statute text ends each amended section with the instrument
//! that last changed it, e.g. `... Lag (2025:732).`

use crate::model::{InstrumentNumber, ParsedDocument, SectionKey};
use regex::Regex;
use std::sync::LazyLock;

static TRAILING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\p{Lu}\p{Ll}+)\s*\((\d{4}):(\d+)\)\.?\s*$").expect("valid regex")
});

/// Parse the marker at the end of one section body, if any
pub fn trailing_marker(body: &str) -> Option<InstrumentNumber> {
    let last_line = body.lines().rev().find(|l| !l.trim().is_empty())?;
    let caps = TRAILING_MARKER.captures(last_line)?;
    Some(InstrumentNumber::new(
        caps.get(2)?.as_str().parse().ok()?,
        caps.get(3)?.as_str().parse().ok()?,
    ))
}

/// Sections whose text names the instrument that last amended them
pub fn section_amendment_markers(parsed: &ParsedDocument) -> Vec<(SectionKey, InstrumentNumber)> {
    parsed
        .sections
        .iter()
        .filter_map(|s| trailing_marker(&s.body).map(|n| (s.key, n)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_sections;

    #[test]
    fn test_marker_on_last_line() {
        assert_eq!(
            trailing_marker("Arbetsgivaren ska ...\nLag (2025:732)."),
            Some(InstrumentNumber::new(2025, 732))
        );
        assert_eq!(
            trailing_marker("Text. Förordning (1998:12)"),
            Some(InstrumentNumber::new(1998, 12))
        );
    }

    #[test]
    fn test_marker_must_be_trailing() {
        assert_eq!(trailing_marker("Enligt lag (2025:732) gäller följande."), None);
        assert_eq!(trailing_marker(""), None);
    }

    #[test]
    fn test_markers_by_section() {
        let parsed = parse_sections("1 § A. Lag (2020:1).\n\n2 § B.\n\n3 § C. Lag (2024:5).");
        let found = section_amendment_markers(&parsed);
        assert_eq!(
            found,
            vec![
                (SectionKey::plain(1), InstrumentNumber::new(2020, 1)),
                (SectionKey::plain(3), InstrumentNumber::new(2024, 5)),
            ]
        );
    }
}
