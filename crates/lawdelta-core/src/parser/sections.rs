use crate::model::{
    ChapterHeading, ParseConfidence, ParseMode, ParsedDocument, ParsedSection, ProvisionNumber,
    SectionKey,
};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

/// `17 a § Text...` at the start of a line
static SECTION_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,4})\s?([a-z])?\s*§\s*(.*)$").expect("valid regex")
});

/// `3 kap. Title` at the start of a line
static CHAPTER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,3})\s?([a-z])?\s*kap\.\s*(.*)$").expect("valid regex")
});

const TRANSITIONAL_HEADING: &str = "övergångsbestämmelser";
const MAX_HEADING_CHARS: usize = 100;
const REJECTION_PENALTY: f32 = 0.1;
const MIN_STRUCTURED_SCORE: f32 = 0.5;
const AMBIGUOUS_SCORE: f32 = 0.2;

/// Sections keyed by identity, in display order
pub type SectionMap = BTreeMap<SectionKey, ParsedSection>;

/// Index a parse by section identity
pub fn section_map(parsed: &ParsedDocument) -> SectionMap {
    parsed
        .sections
        .iter()
        .map(|s| (s.key, s.clone()))
        .collect()
}

#[derive(Debug)]
enum Region {
    Preamble,
    ChapterIntro,
    Section {
        key: SectionKey,
        heading: Option<String>,
        first_line: String,
    },
}

struct Scan<'a> {
    preamble: Vec<&'a str>,
    chapters: Vec<ChapterHeading>,
    sections: Vec<ParsedSection>,
    region: Region,
    buffer: Vec<&'a str>,
    chapter: Option<ProvisionNumber>,
    last_in_chapter: Option<ProvisionNumber>,
    seen: HashSet<SectionKey>,
    rejected: u32,
    ambiguous: bool,
}

impl<'a> Scan<'a> {
    fn new() -> Self {
        Self {
            preamble: Vec::new(),
            chapters: Vec::new(),
            sections: Vec::new(),
            region: Region::Preamble,
            buffer: Vec::new(),
            chapter: None,
            last_in_chapter: None,
            seen: HashSet::new(),
            rejected: 0,
            ambiguous: false,
        }
    }

    /// Close the open region, returning a trailing heading line lifted off
    /// its end when one is present.
    fn close_region(&mut self, lift_heading: bool) -> Option<String> {
        let mut lines = std::mem::take(&mut self.buffer);
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        let heading = if lift_heading { take_heading(&mut lines) } else { None };

        match std::mem::replace(&mut self.region, Region::ChapterIntro) {
            Region::Preamble => self.preamble = lines,
            Region::ChapterIntro => {}
            Region::Section {
                key,
                heading: own_heading,
                first_line,
            } => {
                let mut body = first_line;
                for line in lines {
                    body.push('\n');
                    body.push_str(line.trim_end());
                }
                self.sections.push(ParsedSection {
                    key,
                    heading: own_heading,
                    body: body.trim().to_string(),
                });
            }
        }
        heading
    }

    fn on_chapter(&mut self, chapter: ProvisionNumber, title: &str) {
        if self.chapter.is_some_and(|prev| chapter <= prev) {
            self.ambiguous = true;
        }
        self.close_region(false);
        self.chapter = Some(chapter);
        self.last_in_chapter = None;
        self.chapters.push(ChapterHeading {
            chapter,
            title: title.trim().to_string(),
        });
    }

    /// Returns false when the marker was demoted to body text
    fn on_section(
        &mut self,
        number: ProvisionNumber,
        rest: &str,
        prev_line: Option<&str>,
    ) -> bool {
        let key = SectionKey::new(self.chapter, number);

        if rest.chars().next().is_some_and(char::is_lowercase)
            && prev_line.is_some_and(is_mid_sentence)
        {
            self.rejected += 1;
            return false;
        }

        if self.last_in_chapter.is_some_and(|last| number <= last) {
            if self.seen.contains(&key) {
                self.ambiguous = true;
            }
            self.rejected += 1;
            return false;
        }

        let heading = self.close_region(true);
        self.region = Region::Section {
            key,
            heading,
            first_line: rest.trim_end().to_string(),
        };
        self.last_in_chapter = Some(number);
        self.seen.insert(key);
        true
    }
}

fn is_mid_sentence(line: &str) -> bool {
    line.trim_end()
        .chars()
        .last()
        .is_some_and(|c| c.is_lowercase() || c == ',')
}

fn is_heading_line(line: &str) -> bool {
    let t = line.trim();
    let Some(first) = t.chars().next() else {
        return false;
    };
    let last = t.chars().last().unwrap_or(first);
    first.is_uppercase()
        && t.chars().count() <= MAX_HEADING_CHARS
        && !matches!(last, '.' | ',' | ';' | ':')
        && !t.contains('§')
        && !SECTION_MARKER.is_match(t)
        && !CHAPTER_MARKER.is_match(t)
}

/// Lift a short heading off the end of `lines` if it is set apart by a blank
/// line.
fn take_heading(lines: &mut Vec<&str>) -> Option<String> {
    let n = lines.len();
    if n < 2 || !lines[n - 2].trim().is_empty() || !is_heading_line(lines[n - 1]) {
        return None;
    }
    let heading = lines.pop().map(|l| l.trim().to_string());
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    heading
}

fn chapter_candidate(line: &str) -> Option<(ProvisionNumber, &str)> {
    let caps = CHAPTER_MARKER.captures(line)?;
    let title = caps.get(3).map_or("", |m| m.as_str()).trim();
    let title_ok = title.is_empty()
        || (title.chars().next().is_some_and(char::is_uppercase)
            && title.chars().count() <= MAX_HEADING_CHARS
            && !title.contains('§')
            && !title.ends_with('.')
            && !title.ends_with(','));
    if !title_ok {
        return None;
    }
    Some((provision(&caps)?, title))
}

fn section_candidate(line: &str) -> Option<(ProvisionNumber, &str)> {
    let caps = SECTION_MARKER.captures(line)?;
    let rest = caps.get(3).map_or("", |m| m.as_str());
    Some((provision(&caps)?, rest))
}

fn provision(caps: &regex::Captures<'_>) -> Option<ProvisionNumber> {
    let number: u32 = caps.get(1)?.as_str().parse().ok()?;
    if number == 0 {
        return None;
    }
    Some(match caps.get(2).and_then(|m| m.as_str().chars().next()) {
        Some(c) => ProvisionNumber::with_suffix(number, c),
        None => ProvisionNumber::new(number),
    })
}

/// Split statute text into the regulatory part and the transitional
/// provisions block that follows an `Övergångsbestämmelser` heading.
pub(crate) fn split_transitional(text: &str) -> (&str, Option<&str>) {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().to_lowercase() == TRANSITIONAL_HEADING {
            let block = text[offset + line.len()..].trim();
            return (&text[..offset], Some(block));
        }
        offset += line.len();
    }
    (text, None)
}

fn single_section(text: &str, transitional: Option<&str>, mode: ParseMode) -> ParsedDocument {
    let score = match mode {
        ParseMode::Ambiguous => AMBIGUOUS_SCORE,
        _ => 1.0,
    };
    ParsedDocument {
        preamble: String::new(),
        chapters: Vec::new(),
        sections: vec![ParsedSection {
            key: SectionKey::whole_document(),
            heading: None,
            body: text.trim().to_string(),
        }],
        transitional: transitional.map(String::from),
        confidence: ParseConfidence { mode, score },
    }
}

/// Parse a document into identified sections.
///
/// Body text up to the next marker belongs to the preceding section; text
/// before the first marker is the preamble. Lines that look like markers but
/// would move backwards within a chapter are kept as body text. Duplicate
/// section identities and chapters that go backwards make the split
/// ambiguous; the whole text then comes back as one synthetic section.
pub fn parse_sections(text: &str) -> ParsedDocument {
    let (regulatory, transitional) = split_transitional(text);
    let mut scan = Scan::new();
    let mut prev_line: Option<&str> = None;

    for line in regulatory.lines() {
        let consumed = if let Some((chapter, title)) = chapter_candidate(line) {
            scan.on_chapter(chapter, title);
            true
        } else if let Some((number, rest)) = section_candidate(line) {
            scan.on_section(number, rest, prev_line)
        } else {
            false
        };
        if !consumed {
            scan.buffer.push(line);
        }
        if !line.trim().is_empty() {
            prev_line = Some(line);
        } else {
            prev_line = None;
        }
    }
    scan.close_region(false);

    if scan.ambiguous {
        tracing::debug!(
            rejected = scan.rejected,
            "section split ambiguous, falling back to whole document"
        );
        return single_section(text, transitional, ParseMode::Ambiguous);
    }
    if scan.sections.is_empty() {
        return single_section(text, transitional, ParseMode::Flat);
    }

    let score = (1.0 - REJECTION_PENALTY * scan.rejected as f32).max(MIN_STRUCTURED_SCORE);
    ParsedDocument {
        preamble: scan.preamble.join("\n").trim().to_string(),
        chapters: scan.chapters,
        sections: scan.sections,
        transitional: transitional.map(String::from),
        confidence: ParseConfidence {
            mode: ParseMode::Structured,
            score,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(parsed: &ParsedDocument) -> Vec<String> {
        parsed.sections.iter().map(|s| s.key.to_string()).collect()
    }

    #[test]
    fn test_simple_sections() {
        let parsed = parse_sections("1 § Foo\n\n2 § Bar\nmore bar");
        assert_eq!(keys(&parsed), vec!["1 §", "2 §"]);
        assert_eq!(parsed.sections[1].body, "Bar\nmore bar");
        assert_eq!(parsed.confidence.mode, ParseMode::Structured);
        assert_eq!(parsed.confidence.score, 1.0);
    }

    #[test]
    fn test_empty_text_is_flat() {
        let parsed = parse_sections("");
        assert_eq!(parsed.confidence.mode, ParseMode::Flat);
        assert_eq!(parsed.sections.len(), 1);
        assert!(parsed.sections[0].key.is_whole_document());
        assert_eq!(parsed.sections[0].body, "");
    }

    #[test]
    fn test_transitional_block_is_not_split() {
        let text = "1 § A\n\n2 § B\n\nÖvergångsbestämmelser\n\n2025:1\n1 § gäller inte.";
        let parsed = parse_sections(text);
        assert_eq!(keys(&parsed), vec!["1 §", "2 §"]);
        assert_eq!(
            parsed.transitional.as_deref(),
            Some("2025:1\n1 § gäller inte.")
        );
    }

    #[test]
    fn test_heading_lift() {
        let text = "1 § A\n\nSärskilda regler\n2 § B";
        let parsed = parse_sections(text);
        assert_eq!(parsed.sections[0].body, "A");
        assert_eq!(parsed.sections[1].heading.as_deref(), Some("Särskilda regler"));
    }

    #[test]
    fn test_heading_requires_blank_line() {
        let text = "1 § A\nMer text utan punkt\n2 § B";
        let parsed = parse_sections(text);
        assert_eq!(parsed.sections[0].body, "A\nMer text utan punkt");
        assert_eq!(parsed.sections[1].heading, None);
    }
}
