//! Entry-into-force dates from the transitional provisions block
//!
//! ```text
//! Övergångsbestämmelser
//!
//! 2025:732
//! 1. Denna lag träder i kraft den 1 januari 2026.
//! ```

use crate::model::InstrumentNumber;
use crate::parser::sections::split_transitional;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ENTRY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:SFS\s*)?(\d{4}):(\d+)\s*$").expect("valid regex")
});

static IN_FORCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)träder\s+i\s+kraft\s+den\s+(\d{1,2})\s+(januari|februari|mars|april|maj|juni|juli|augusti|september|oktober|november|december)\s+(\d{4})",
    )
    .expect("valid regex")
});

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "januari" => 1,
        "februari" => 2,
        "mars" => 3,
        "april" => 4,
        "maj" => 5,
        "juni" => 6,
        "juli" => 7,
        "augusti" => 8,
        "september" => 9,
        "oktober" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(month)
}

fn in_force_date(line: &str) -> Option<NaiveDate> {
    let caps = IN_FORCE.captures(line)?;
    let day = caps.get(1)?.as_str().parse().ok()?;
    let month = month_number(caps.get(2)?.as_str())?;
    let year = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Map each instrument in the transitional block to the date it enters into
/// force. The first date stated under an instrument wins; instruments without
/// a parseable date are left out.
pub fn parse_transitional_provisions(text: &str) -> BTreeMap<InstrumentNumber, NaiveDate> {
    let mut out = BTreeMap::new();
    let Some(block) = split_transitional(text).1 else {
        return out;
    };

    let mut current: Option<InstrumentNumber> = None;
    for line in block.lines() {
        if let Some(caps) = ENTRY_HEADER.captures(line) {
            current = match (caps[1].parse::<u16>(), caps[2].parse::<u32>()) {
                (Ok(year), Ok(number)) => Some(InstrumentNumber::new(year, number)),
                _ => None,
            };
            continue;
        }
        if let (Some(instrument), Some(date)) = (current, in_force_date(line)) {
            out.entry(instrument).or_insert(date);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_entries() {
        let text = "1 § A\n\nÖvergångsbestämmelser\n\n2024:10\nDenna lag träder i kraft den 1 juli 2024.\n\n2025:732\n1. Denna lag träder i kraft den 15 Januari 2026.\n2. Äldre bestämmelser gäller.";
        let map = parse_transitional_provisions(text);
        assert_eq!(
            map.get(&InstrumentNumber::new(2024, 10)),
            NaiveDate::from_ymd_opt(2024, 7, 1).as_ref()
        );
        assert_eq!(
            map.get(&InstrumentNumber::new(2025, 732)),
            NaiveDate::from_ymd_opt(2026, 1, 15).as_ref()
        );
    }

    #[test]
    fn test_no_block() {
        assert!(parse_transitional_provisions("1 § träder i kraft den 1 juli 2024").is_empty());
    }

    #[test]
    fn test_invalid_calendar_date_skipped() {
        let text = "Övergångsbestämmelser\n2024:1\nträder i kraft den 31 februari 2024";
        assert!(parse_transitional_provisions(text).is_empty());
    }
}
