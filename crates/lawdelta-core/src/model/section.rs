//! Section identity and parse results

use crate::diff::has_substantive_changes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chapter or section number with an optional inserted-letter suffix
///
/// `17 a` sorts after `17` and before `18`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ProvisionNumber {
    pub number: u32,
    pub suffix: Option<char>,
}

impl ProvisionNumber {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            suffix: None,
        }
    }

    pub fn with_suffix(number: u32, suffix: char) -> Self {
        Self {
            number,
            suffix: Some(suffix.to_ascii_lowercase()),
        }
    }

    /// `a` => 1 ... `z` => 26, none => 0
    fn suffix_rank(&self) -> u32 {
        self.suffix
            .filter(|c| c.is_ascii_lowercase())
            .map(|c| c as u32 - 'a' as u32 + 1)
            .unwrap_or(0)
    }

    /// Parse `"17"`, `"17 a"` or `"17a"`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits_end = s
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        let number = s[..digits_end].parse().ok()?;
        let mut rest = s[digits_end..].trim().chars();
        match (rest.next(), rest.next()) {
            (None, _) => Some(Self::new(number)),
            (Some(c), None) if c.is_ascii_alphabetic() => Some(Self::with_suffix(number, c)),
            _ => None,
        }
    }
}

impl fmt::Display for ProvisionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.suffix {
            Some(c) => write!(f, "{} {}", self.number, c),
            None => write!(f, "{}", self.number),
        }
    }
}

/// Identity of one section: `(chapter, number, suffix)`
///
/// Identity never depends on position in the text. Derived ordering is the
/// display order: chapterless sections first, then by chapter, number and
/// suffix.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SectionKey {
    pub chapter: Option<ProvisionNumber>,
    pub section: ProvisionNumber,
}

impl SectionKey {
    pub fn new(chapter: Option<ProvisionNumber>, section: ProvisionNumber) -> Self {
        Self { chapter, section }
    }

    pub fn plain(number: u32) -> Self {
        Self::new(None, ProvisionNumber::new(number))
    }

    pub fn in_chapter(chapter: u32, number: u32) -> Self {
        Self::new(Some(ProvisionNumber::new(chapter)), ProvisionNumber::new(number))
    }

    /// Key of the synthetic section holding an unsplit document
    pub fn whole_document() -> Self {
        Self::plain(0)
    }

    pub fn is_whole_document(&self) -> bool {
        *self == Self::whole_document()
    }

    /// Lexicographically sortable rendering, e.g. `003.000.017.001` for
    /// `3 kap. 17 a §`
    pub fn sort_key(&self) -> String {
        let (ch, ch_rank) = self
            .chapter
            .map(|c| (c.number, c.suffix_rank()))
            .unwrap_or((0, 0));
        format!(
            "{:03}.{:03}.{:03}.{:03}",
            ch,
            ch_rank,
            self.section.number,
            self.section.suffix_rank()
        )
    }

    /// `"3"` or `"3 a"`, absent for chapterless documents
    pub fn chapter_label(&self) -> Option<String> {
        self.chapter.map(|c| c.to_string())
    }

    pub fn section_label(&self) -> String {
        self.section.to_string()
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_whole_document() {
            return f.write_str("(whole document)");
        }
        if let Some(ch) = self.chapter {
            write!(f, "{} kap. ", ch)?;
        }
        write!(f, "{} §", self.section)
    }
}

/// One identified section of a parsed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSection {
    pub key: SectionKey,
    pub heading: Option<String>,
    pub body: String,
}

impl ParsedSection {
    /// True when the body or the heading differs beyond whitespace
    pub fn differs_from(&self, other: &ParsedSection) -> bool {
        let heading = |s: &ParsedSection| s.heading.clone().unwrap_or_default();
        has_substantive_changes(&self.body, &other.body)
            || has_substantive_changes(&heading(self), &heading(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterHeading {
    pub chapter: ProvisionNumber,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Section markers found and split
    Structured,
    /// No section markers at all; one synthetic section
    Flat,
    /// Markers found but contradictory; one synthetic section
    Ambiguous,
}

/// How much a consumer can trust the split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParseConfidence {
    pub mode: ParseMode,
    /// `0.0..=1.0`
    pub score: f32,
}

impl ParseConfidence {
    pub fn is_single_section(&self) -> bool {
        !matches!(self.mode, ParseMode::Structured)
    }
}

/// Output of the section parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDocument {
    /// Text before the first section marker
    pub preamble: String,
    pub chapters: Vec<ChapterHeading>,
    /// In document order
    pub sections: Vec<ParsedSection>,
    /// Raw transitional provisions block, if the document has one
    pub transitional: Option<String>,
    pub confidence: ParseConfidence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_orders_between_base_numbers() {
        let mut keys = vec![
            SectionKey::plain(18),
            SectionKey::new(None, ProvisionNumber::with_suffix(17, 'a')),
            SectionKey::plain(17),
            SectionKey::plain(2),
        ];
        keys.sort();
        let labels: Vec<_> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(labels, vec!["2 §", "17 §", "17 a §", "18 §"]);
    }

    #[test]
    fn test_chapter_orders_before_section() {
        let a = SectionKey::in_chapter(2, 9);
        let b = SectionKey::in_chapter(3, 1);
        assert!(a < b);
        assert!(a.sort_key() < b.sort_key());
    }

    #[test]
    fn test_sort_key_format() {
        let key = SectionKey::new(
            Some(ProvisionNumber::new(3)),
            ProvisionNumber::with_suffix(17, 'a'),
        );
        assert_eq!(key.sort_key(), "003.000.017.001");
        assert_eq!(key.to_string(), "3 kap. 17 a §");
    }

    #[test]
    fn test_provision_number_parse() {
        assert_eq!(ProvisionNumber::parse("17"), Some(ProvisionNumber::new(17)));
        assert_eq!(
            ProvisionNumber::parse("17 a"),
            Some(ProvisionNumber::with_suffix(17, 'a'))
        );
        assert_eq!(
            ProvisionNumber::parse("17B"),
            Some(ProvisionNumber::with_suffix(17, 'b'))
        );
        assert_eq!(ProvisionNumber::parse("a"), None);
        assert_eq!(ProvisionNumber::parse("17 ab"), None);
    }

    #[test]
    fn test_heading_edit_is_a_difference() {
        let section = |heading: Option<&str>, body: &str| ParsedSection {
            key: SectionKey::plain(2),
            heading: heading.map(String::from),
            body: body.to_string(),
        };
        let before = section(Some("Rubrik ett"), "B");
        assert!(before.differs_from(&section(Some("Rubrik två"), "B")));
        assert!(before.differs_from(&section(None, "B")));
        assert!(!before.differs_from(&section(Some("Rubrik  ett"), "B ")));
    }
}
