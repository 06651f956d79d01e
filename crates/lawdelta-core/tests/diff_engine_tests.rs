#![allow(clippy::unwrap_used, clippy::expect_used)]

use lawdelta_core::diff::{
    compare_words, compute_diff, generate_unified_diff, has_substantive_changes,
};
use proptest::prelude::*;

#[test]
fn test_whitespace_invariance_examples() {
    assert!(!has_substantive_changes("Some   text", "Some text"));
    assert!(has_substantive_changes("Word1 Word2", "Word1 DifferentWord2"));
}

#[test]
fn test_both_empty_no_changes() {
    assert!(!has_substantive_changes("", ""));
    let d = compute_diff("", "");
    assert_eq!(d.added_lines + d.removed_lines, 0);
    assert_eq!(generate_unified_diff("", "", 3), "--- document\told\n+++ document\tnew\n");
}

#[test]
fn test_unified_diff_lines_reconstruct_new_text() {
    let old = "1 § A\n2 § B\n3 § C\n4 § D\n";
    let new = "1 § A\n2 § B2\n3 § C\n4 § D\n5 § E\n";
    let patch = generate_unified_diff(old, new, 3);
    let rebuilt: Vec<&str> = patch
        .lines()
        .skip(2)
        .filter(|l| !l.starts_with("@@") && !l.starts_with('-'))
        .map(|l| &l[1..])
        .collect();
    assert_eq!(rebuilt, new.lines().collect::<Vec<_>>());
}

#[test]
fn test_summary_counts() {
    let d = compute_diff("a\nb\nc\nd\n", "a\nx\nc\nd\ne\n");
    assert_eq!(d.added_lines, 2);
    assert_eq!(d.removed_lines, 1);
    assert_eq!(d.unchanged_lines, 3);
    assert_eq!(d.summary, "+2 lines, -1 lines (50.0% changed)");
}

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zåäö]{1,6}", 0..8).prop_map(|w| w.join(" "))
}

fn respaced(text: String) -> impl Strategy<Value = (String, String)> {
    let parts: Vec<String> = text.split(' ').map(String::from).collect();
    let n = parts.len();
    prop::collection::vec(prop::sample::select(vec![" ", "  ", "\n", "\t", " \n "]), n)
        .prop_map(move |seps| {
            let mut out = String::from("  ");
            for (p, s) in parts.iter().zip(seps) {
                out.push_str(p);
                out.push_str(s);
            }
            (text.clone(), out)
        })
}

proptest! {
    #[test]
    fn prop_substantive_change_is_symmetric(a in "[ a-c\n]{0,20}", b in "[ a-c\n]{0,20}") {
        prop_assert_eq!(has_substantive_changes(&a, &b), has_substantive_changes(&b, &a));
    }

    #[test]
    fn prop_respacing_is_never_substantive((a, b) in words().prop_flat_map(respaced)) {
        prop_assert!(!has_substantive_changes(&a, &b));
    }

    #[test]
    fn prop_line_counts_cover_both_sides(a in "[ab\n]{0,30}", b in "[ab\n]{0,30}") {
        let d = compute_diff(&a, &b);
        prop_assert_eq!(d.unchanged_lines + d.removed_lines, a.lines().count());
        prop_assert_eq!(d.unchanged_lines + d.added_lines, b.lines().count());
    }

    #[test]
    fn prop_word_chunks_rebuild_both_sides(a in words(), b in words()) {
        use lawdelta_core::diff::WordChunkKind;
        let chunks = compare_words(&a, &b);
        let side = |skip: WordChunkKind| chunks
            .iter()
            .filter(|c| c.kind != skip)
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(
            side(WordChunkKind::Added),
            a.split_whitespace().collect::<Vec<_>>().join(" ")
        );
        prop_assert_eq!(
            side(WordChunkKind::Removed),
            b.split_whitespace().collect::<Vec<_>>().join(" ")
        );
    }
}
