#![allow(clippy::unwrap_used, clippy::expect_used)]

use lawdelta_core::classify::{classify_changes, classify_section_maps};
use lawdelta_core::model::{
    ChangeEventKind, ChangeTarget, ContentType, SectionChangeKind, SectionKey,
};
use lawdelta_core::parser::{parse_sections, section_map};

fn target(n: u32) -> ChangeTarget {
    ChangeTarget::Section(SectionKey::plain(n))
}

#[test]
fn test_new_law_has_no_section_records() {
    let c = classify_changes("", "1 § Foo", ContentType::SfsLaw, false);
    assert!(c.changes.is_empty());
    assert_eq!(c.event, Some(ChangeEventKind::NewLaw));
}

#[test]
fn test_new_court_case_is_a_ruling() {
    let c = classify_changes("", "Domskäl ...", ContentType::CourtCaseAd, false);
    assert_eq!(c.event, Some(ChangeEventKind::NewRuling));
}

#[test]
fn test_amendment_modifies_and_adds() {
    let c = classify_changes(
        "1 § A\n\n2 § B",
        "1 § A2\n\n2 § B\n\n3 § C",
        ContentType::SfsLaw,
        true,
    );
    assert_eq!(c.event, Some(ChangeEventKind::AmendmentDetected));
    assert!(!c.degraded);
    assert_eq!(c.changes.len(), 2);

    assert_eq!(c.changes[0].target, target(1));
    assert_eq!(c.changes[0].kind, SectionChangeKind::Modified);
    assert_eq!(c.changes[0].old_text.as_deref(), Some("A"));
    assert_eq!(c.changes[0].new_text.as_deref(), Some("A2"));

    assert_eq!(c.changes[1].target, target(3));
    assert_eq!(c.changes[1].kind, SectionChangeKind::Added);
    assert_eq!(c.changes[1].old_text, None);
    assert_eq!(c.changes[1].new_text.as_deref(), Some("C"));
}

#[test]
fn test_repeal() {
    let c = classify_changes(
        "1 § A\n\n2 § B\n\n3 § C",
        "1 § A\n\n2 § B",
        ContentType::SfsLaw,
        true,
    );
    assert_eq!(c.changes.len(), 1);
    assert_eq!(c.changes[0].target, target(3));
    assert_eq!(c.changes[0].kind, SectionChangeKind::Repealed);
    assert_eq!(c.changes[0].old_text.as_deref(), Some("C"));
    assert_eq!(c.changes[0].new_text, None);
    assert_eq!(c.changed_section_labels(), vec!["3 §"]);
}

#[test]
fn test_whitespace_reflow_is_not_a_change() {
    let c = classify_changes(
        "1 § Första raden\nandra raden.",
        "1 § Första raden andra\nraden.",
        ContentType::SfsLaw,
        true,
    );
    assert!(c.changes.is_empty());
    assert_eq!(c.event, None);
}

#[test]
fn test_inserted_suffix_section_is_added_not_modified() {
    let c = classify_changes(
        "17 § A\n\n18 § B",
        "17 § A\n\n17 a § Ny\n\n18 § B",
        ContentType::SfsLaw,
        true,
    );
    assert_eq!(c.changes.len(), 1);
    assert_eq!(c.changes[0].kind, SectionChangeKind::Added);
    assert_eq!(c.changes[0].target.label(), "17 a §");
}

#[test]
fn test_ambiguous_side_degrades_to_whole_document() {
    let old = "1 § A\n\n1 § A igen";
    let new = "1 § A\n\n2 § B";
    let c = classify_changes(old, new, ContentType::SfsLaw, true);
    assert!(c.degraded);
    assert_eq!(c.changes.len(), 1);
    assert_eq!(c.changes[0].target, ChangeTarget::WholeDocument);
    assert_eq!(c.changes[0].old_text.as_deref(), Some(old));
    assert_eq!(c.changes[0].new_text.as_deref(), Some(new));
}

#[test]
fn test_section_map_classification() {
    let old = section_map(&parse_sections("1 § A\n\n2 § B"));
    let new = section_map(&parse_sections("1 § A\n\n3 § C"));
    let drafts = classify_section_maps(&old, &new);
    let kinds: Vec<_> = drafts.iter().map(|d| (d.target.label(), d.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("2 §".to_string(), SectionChangeKind::Repealed),
            ("3 §".to_string(), SectionChangeKind::Added),
        ]
    );
}

#[test]
fn test_classification_is_deterministic() {
    let a = classify_changes("1 § A\n\n2 § B", "2 § B2\n\n4 § D", ContentType::SfsLaw, true);
    let b = classify_changes("1 § A\n\n2 § B", "2 § B2\n\n4 § D", ContentType::SfsLaw, true);
    assert_eq!(a, b);
}
