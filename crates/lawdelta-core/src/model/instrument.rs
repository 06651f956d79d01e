use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of a statute-book instrument, `year:serial`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentNumber {
    pub year: u16,
    pub number: u32,
}

impl InstrumentNumber {
    pub fn new(year: u16, number: u32) -> Self {
        Self { year, number }
    }

    /// Accepts `"2025:732"` and `"SFS 2025:732"`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix("SFS")
            .map(str::trim_start)
            .unwrap_or(s);
        let (year, number) = s.split_once(':')?;
        Some(Self {
            year: year.trim().parse().ok()?,
            number: number.trim().parse().ok()?,
        })
    }

    /// `2025:732`
    pub fn bare(&self) -> String {
        format!("{}:{}", self.year, self.number)
    }
}

impl fmt::Display for InstrumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SFS {}:{}", self.year, self.number)
    }
}
