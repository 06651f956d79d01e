/// Collapse every whitespace run (newlines included) to one space and trim
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the texts differ in anything other than whitespace.
///
/// Symmetric in its arguments.
pub fn has_substantive_changes(old: &str, new: &str) -> bool {
    !old.split_whitespace().eq(new.split_whitespace())
}
