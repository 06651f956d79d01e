use crate::diff::engine::split_lines;
use crate::diff::myers::{diff_slices, Edit};
use std::fmt::Write;
use std::ops::Range;

const DEFAULT_LABEL: &str = "document";

/// Render a unified diff of `old` against `new` labelled `document`.
///
/// Each change is surrounded by up to `context_lines` unchanged lines;
/// hunks whose context would overlap are merged. Identical inputs produce
/// only the two header lines.
pub fn generate_unified_diff(old: &str, new: &str, context_lines: usize) -> String {
    render_unified_diff(DEFAULT_LABEL, old, new, context_lines)
}

pub fn render_unified_diff(label: &str, old: &str, new: &str, context_lines: usize) -> String {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let edits = diff_slices(&old_lines, &new_lines);

    let mut out = format!("--- {label}\told\n+++ {label}\tnew\n");
    for range in hunk_ranges(&edits, context_lines) {
        write_hunk(
            &mut out,
            &edits[range.clone()],
            &edits[..range.start],
            &old_lines,
            &new_lines,
        );
    }
    out
}

/// Edit-index ranges of each hunk, context included
fn hunk_ranges(edits: &[Edit], context: usize) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut last_change: Option<usize> = None;

    for (i, edit) in edits.iter().enumerate() {
        if !edit.is_change() {
            continue;
        }
        let merges = last_change.is_some_and(|last| i - last - 1 <= 2 * context);
        if !merges {
            close_range(&mut ranges, last_change, context, edits.len());
            ranges.push(i.saturating_sub(context)..i + 1);
        }
        last_change = Some(i);
    }
    close_range(&mut ranges, last_change, context, edits.len());
    ranges
}

fn close_range(
    ranges: &mut [Range<usize>],
    last_change: Option<usize>,
    context: usize,
    len: usize,
) {
    if let (Some(last), Some(open)) = (last_change, ranges.last_mut()) {
        open.end = (last + 1 + context).min(len);
    }
}

fn write_hunk(out: &mut String, hunk: &[Edit], before: &[Edit], old: &[&str], new: &[&str]) {
    let old_before = before
        .iter()
        .filter(|e| !matches!(e, Edit::Insert { .. }))
        .count();
    let new_before = before
        .iter()
        .filter(|e| !matches!(e, Edit::Delete { .. }))
        .count();
    let old_len = hunk
        .iter()
        .filter(|e| !matches!(e, Edit::Insert { .. }))
        .count();
    let new_len = hunk
        .iter()
        .filter(|e| !matches!(e, Edit::Delete { .. }))
        .count();

    let start = |before: usize, len: usize| if len == 0 { before } else { before + 1 };
    let _ = writeln!(
        out,
        "@@ -{},{} +{},{} @@",
        start(old_before, old_len),
        old_len,
        start(new_before, new_len),
        new_len
    );

    for edit in hunk {
        let _ = match *edit {
            Edit::Equal { old: i, .. } => writeln!(out, " {}", old[i]),
            Edit::Delete { old: i } => writeln!(out, "-{}", old[i]),
            Edit::Insert { new: j } => writeln!(out, "+{}", new[j]),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}\n")).collect()
    }

    #[test]
    fn test_identical_has_only_headers() {
        let d = generate_unified_diff("a\n", "a\n", 3);
        assert_eq!(d, "--- document\told\n+++ document\tnew\n");
    }

    #[test]
    fn test_single_change_with_context() {
        let old = numbered(10);
        let new = old.replace("line 5\n", "line five\n");
        let d = generate_unified_diff(&old, &new, 3);
        let expected = "--- document\told\n+++ document\tnew\n\
@@ -2,7 +2,7 @@\n line 2\n line 3\n line 4\n-line 5\n+line five\n line 6\n line 7\n line 8\n";
        assert_eq!(d, expected);
    }

    #[test]
    fn test_distant_changes_make_two_hunks() {
        let old = numbered(20);
        let new = old
            .replace("line 2\n", "line two\n")
            .replace("line 18\n", "line eighteen\n");
        let d = generate_unified_diff(&old, &new, 3);
        assert_eq!(d.matches("@@ -").count(), 2);
        assert!(d.contains("@@ -1,5 +1,5 @@"));
        assert!(d.contains("@@ -15,6 +15,6 @@"));
    }

    #[test]
    fn test_close_changes_merge() {
        let old = numbered(12);
        let new = old
            .replace("line 3\n", "line three\n")
            .replace("line 9\n", "line nine\n");
        let d = generate_unified_diff(&old, &new, 3);
        assert_eq!(d.matches("@@ -").count(), 1);
        assert!(d.contains("@@ -1,12 +1,12 @@"));
    }

    #[test]
    fn test_insert_into_empty() {
        let d = generate_unified_diff("", "a\nb\n", 3);
        assert!(d.ends_with("@@ -0,0 +1,2 @@\n+a\n+b\n"));
    }
}
