#![allow(clippy::unwrap_used, clippy::expect_used)]

use lawdelta_core::model::{ParseMode, ProvisionNumber, SectionKey};
use lawdelta_core::parser::{parse_sections, section_amendment_markers};

const CHAPTERED: &str = "\
Arbetsmiljölag (1977:1160)

1 kap. Lagens ändamål och tillämpningsområde

1 § Lagens ändamål är att förebygga ohälsa och olycksfall i arbetet.

2 § Denna lag gäller varje verksamhet i vilken arbetstagare utför arbete.
Lag (2002:585).

2 a § Vid tillämpningen av 3 kap. 7 § ska även följande gälla.

Arbetsgivarens skyldigheter
3 § Arbetsgivaren ska vidta alla åtgärder.

2 kap. Arbetsmiljöns beskaffenhet

1 § Arbetsmiljön skall vara tillfredsställande.
";

#[test]
fn test_chapters_and_suffixes() {
    let parsed = parse_sections(CHAPTERED);
    assert_eq!(parsed.confidence.mode, ParseMode::Structured);
    let labels: Vec<String> = parsed.sections.iter().map(|s| s.key.to_string()).collect();
    assert_eq!(
        labels,
        vec![
            "1 kap. 1 §",
            "1 kap. 2 §",
            "1 kap. 2 a §",
            "1 kap. 3 §",
            "2 kap. 1 §"
        ]
    );
    assert_eq!(parsed.preamble, "Arbetsmiljölag (1977:1160)");
    assert_eq!(parsed.chapters.len(), 2);
    assert_eq!(
        parsed.chapters[0].title,
        "Lagens ändamål och tillämpningsområde"
    );
}

#[test]
fn test_letter_suffix_does_not_collide_with_base() {
    let parsed = parse_sections(CHAPTERED);
    let base = SectionKey::in_chapter(1, 2);
    let inserted = SectionKey::new(
        Some(ProvisionNumber::new(1)),
        ProvisionNumber::with_suffix(2, 'a'),
    );
    let base_body = &parsed.sections.iter().find(|s| s.key == base).unwrap().body;
    let inserted_body = &parsed
        .sections
        .iter()
        .find(|s| s.key == inserted)
        .unwrap()
        .body;
    assert!(base_body.ends_with("Lag (2002:585)."));
    assert!(inserted_body.starts_with("Vid tillämpningen"));
}

#[test]
fn test_in_prose_chapter_reference_is_body() {
    let parsed = parse_sections(CHAPTERED);
    // "3 kap. 7 §" inside 2 a § must not open a chapter
    assert_eq!(parsed.chapters.len(), 2);
}

#[test]
fn test_heading_attached_to_following_section() {
    let parsed = parse_sections(CHAPTERED);
    let s3 = parsed
        .sections
        .iter()
        .find(|s| s.key == SectionKey::in_chapter(1, 3))
        .unwrap();
    assert_eq!(s3.heading.as_deref(), Some("Arbetsgivarens skyldigheter"));
    let s2a = &parsed.sections[2];
    assert!(!s2a.body.contains("Arbetsgivarens skyldigheter"));
}

#[test]
fn test_chapter_line_ending_in_period_is_not_a_heading() {
    let text = "1 § Se\n3 kap. om tillsyn.\n\n2 § B";
    let parsed = parse_sections(text);
    assert!(parsed.chapters.is_empty());
    assert_eq!(parsed.sections[0].body, "Se\n3 kap. om tillsyn.");
}

#[test]
fn test_no_markers_is_confidently_flat() {
    let parsed = parse_sections("Förordning utan paragrafer.\nBara löptext.");
    assert_eq!(parsed.confidence.mode, ParseMode::Flat);
    assert_eq!(parsed.confidence.score, 1.0);
    assert_eq!(parsed.sections.len(), 1);
    assert!(parsed.sections[0].key.is_whole_document());
}

#[test]
fn test_duplicate_identity_falls_back() {
    let text = "1 § A\n\n2 § B\n\n2 § B igen\n\n3 § C";
    let parsed = parse_sections(text);
    assert_eq!(parsed.confidence.mode, ParseMode::Ambiguous);
    assert!(parsed.confidence.score < 0.5);
    assert_eq!(parsed.sections.len(), 1);
    assert_eq!(parsed.sections[0].body, text);
}

#[test]
fn test_backwards_chapter_falls_back() {
    let text = "2 kap. Andra\n\n1 § A\n\n1 kap. Första\n\n1 § B";
    let parsed = parse_sections(text);
    assert_eq!(parsed.confidence.mode, ParseMode::Ambiguous);
}

#[test]
fn test_backwards_unseen_number_is_body_with_penalty() {
    let text = "1 § A\n\n5 § E\n\n3 § F\n\n6 § G";
    let parsed = parse_sections(text);
    assert_eq!(parsed.confidence.mode, ParseMode::Structured);
    assert!(parsed.confidence.score < 1.0);
    let labels: Vec<String> = parsed.sections.iter().map(|s| s.key.to_string()).collect();
    assert_eq!(labels, vec!["1 §", "5 §", "6 §"]);
    assert!(parsed.sections[1].body.contains("3 § F"));
}

#[test]
fn test_wrapped_cross_reference_is_body() {
    let text = "1 § Bestämmelserna i\n2 § andra stycket gäller också.\n\n2 § Ny paragraf.";
    let parsed = parse_sections(text);
    assert_eq!(parsed.confidence.mode, ParseMode::Structured);
    assert_eq!(parsed.sections.len(), 2);
    assert_eq!(
        parsed.sections[0].body,
        "Bestämmelserna i\n2 § andra stycket gäller också."
    );
}

#[test]
fn test_repealed_section_stub_is_still_a_section() {
    let text = "1 § A.\n\n2 § har upphävts genom lag (2009:1).\n\n3 § C.";
    let parsed = parse_sections(text);
    assert_eq!(parsed.sections.len(), 3);
}

#[test]
fn test_parser_never_panics_on_odd_input() {
    for text in ["§", "§§ 1", "99999 §", "\n\n\n", "1 kap.", "0 § noll", "1 a"] {
        let parsed = parse_sections(text);
        assert!(!parsed.sections.is_empty());
    }
}

#[test]
fn test_markers_found_per_section() {
    let parsed = parse_sections(CHAPTERED);
    let markers = section_amendment_markers(&parsed);
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].0, SectionKey::in_chapter(1, 2));
    assert_eq!(markers[0].1.to_string(), "SFS 2002:585");
}
