use crate::errors::{LawDeltaError, Result};
use chrono::NaiveDate;

/// Parse a strict `YYYY-MM-DD` calendar date
///
/// # Errors
///
/// Returns `LawDeltaError::InvalidDate` for any other shape or for dates
/// that do not exist.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    let well_formed = trimmed.len() == 10
        && trimmed
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });
    if !well_formed {
        return Err(LawDeltaError::InvalidDate {
            input: input.to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| LawDeltaError::InvalidDate {
        input: input.to_string(),
        reason: e.to_string(),
    })
}
