//! Word-level comparison for showing what changed inside a section

use crate::diff::myers::{diff_slices, Edit};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WordChunkKind {
    Equal,
    Added,
    Removed,
}

/// A run of consecutive words with the same fate, joined by single spaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordChunk {
    pub kind: WordChunkKind,
    pub text: String,
}

/// Compare two texts word by word, ignoring how the words are spaced
pub fn compare_words(old: &str, new: &str) -> Vec<WordChunk> {
    let old_words: Vec<&str> = old.split_whitespace().collect();
    let new_words: Vec<&str> = new.split_whitespace().collect();

    let mut chunks: Vec<WordChunk> = Vec::new();
    for edit in diff_slices(&old_words, &new_words) {
        let (kind, word) = match edit {
            Edit::Equal { old, .. } => (WordChunkKind::Equal, old_words[old]),
            Edit::Delete { old } => (WordChunkKind::Removed, old_words[old]),
            Edit::Insert { new } => (WordChunkKind::Added, new_words[new]),
        };
        match chunks.last_mut() {
            Some(last) if last.kind == kind => {
                last.text.push(' ');
                last.text.push_str(word);
            }
            _ => chunks.push(WordChunk {
                kind,
                text: word.to_string(),
            }),
        }
    }
    chunks
}
