pub mod batch;
pub mod ingest;
pub mod query;
pub mod repeal;

use chrono::NaiveDate;
use lawdelta_core::dates::parse_iso_date;
use lawdelta_core::errors::ExError;
use serde::Serialize;

/// clap value parser for `YYYY-MM-DD` arguments
pub fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_iso_date(raw).map_err(|e| ExError::from(e).to_string())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
