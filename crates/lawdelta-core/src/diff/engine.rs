use crate::diff::myers::{diff_slices, Edit};
use serde::Serialize;

/// Line diff between two texts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub added_lines: usize,
    pub removed_lines: usize,
    pub unchanged_lines: usize,
    #[serde(skip)]
    pub edits: Vec<Edit>,
    /// `+A lines, -R lines (P% changed)` or `No text changes detected`
    pub summary: String,
}

impl DiffResult {
    pub fn has_changes(&self) -> bool {
        self.added_lines + self.removed_lines > 0
    }

    /// Share of changed lines among all lines touched by the diff, in percent
    pub fn percent_changed(&self) -> f64 {
        let changed = self.added_lines + self.removed_lines;
        let total = changed + self.unchanged_lines;
        if total == 0 {
            0.0
        } else {
            changed as f64 / total as f64 * 100.0
        }
    }
}

/// Split text into lines; a trailing newline does not start another line
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

/// Line-level diff of `old` against `new`
pub fn compute_diff(old: &str, new: &str) -> DiffResult {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let edits = diff_slices(&old_lines, &new_lines);

    let (mut added, mut removed, mut unchanged) = (0, 0, 0);
    for edit in &edits {
        match edit {
            Edit::Equal { .. } => unchanged += 1,
            Edit::Delete { .. } => removed += 1,
            Edit::Insert { .. } => added += 1,
        }
    }

    let mut result = DiffResult {
        added_lines: added,
        removed_lines: removed,
        unchanged_lines: unchanged,
        edits,
        summary: String::new(),
    };
    result.summary = summarize(&result);
    result
}

fn summarize(result: &DiffResult) -> String {
    let mut parts = Vec::new();
    if result.added_lines > 0 {
        parts.push(format!("+{} lines", result.added_lines));
    }
    if result.removed_lines > 0 {
        parts.push(format!("-{} lines", result.removed_lines));
    }
    if parts.is_empty() {
        return "No text changes detected".to_string();
    }
    format!(
        "{} ({:.1}% changed)",
        parts.join(", "),
        result.percent_changed()
    )
}
