#![allow(dead_code, clippy::unwrap_used)]

use chrono::{NaiveDate, TimeZone, Utc};
use lawdelta_core::model::ContentType;
use lawdelta_core::policy::NoopUpdatePolicyHook;
use lawdelta_engine::commands::ingest::{apply_update, DocumentUpdate, IngestOptions, UpdateReport};
use lawdelta_store::db;
use rusqlite::Connection;
use tempfile::TempDir;

pub const NUMBER: &str = "SFS 1998:808";
pub const BASE: &str = "1 § A\n\n2 § B";
pub const AFTER_2020: &str = "1 § A2\n\n2 § B\n\n3 § C";
pub const AFTER_2024: &str = "1 § A2\n\n3 § C";

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// On-disk database so batch workers can open their own connections
pub fn setup_db() -> (TempDir, Connection) {
    let dir = TempDir::new().unwrap();
    let conn = db::open_ready(dir.path().join("lawdelta.db")).unwrap();
    (dir, conn)
}

pub fn update(number: &str, new_text: &str) -> DocumentUpdate {
    DocumentUpdate {
        document_number: number.to_string(),
        title: "Miljöbalk".to_string(),
        content_type: ContentType::SfsLaw,
        old_full_text: None,
        old_markup: None,
        new_full_text: new_text.to_string(),
        new_markup: None,
        amendment_number_hint: None,
        subtitle: None,
        source_timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        effective_date: None,
        amendment_full_text: None,
        publication_date: None,
    }
}

pub fn amendment(
    number: &str,
    new_text: &str,
    instrument: &str,
    effective: &str,
) -> DocumentUpdate {
    DocumentUpdate {
        amendment_number_hint: Some(instrument.to_string()),
        effective_date: Some(date(effective)),
        ..update(number, new_text)
    }
}

pub fn apply(conn: &mut Connection, u: &DocumentUpdate) -> UpdateReport {
    apply_update(conn, u, &IngestOptions::default(), &NoopUpdatePolicyHook).unwrap()
}

/// BASE, then SFS 2020:100 in force 2020-01-01, then SFS 2024:5 in force 2024-01-01
pub fn seed_history(conn: &mut Connection) {
    apply(conn, &update(NUMBER, BASE));
    apply(conn, &amendment(NUMBER, AFTER_2020, "SFS 2020:100", "2020-01-01"));
    apply(conn, &amendment(NUMBER, AFTER_2024, "2024:5", "2024-01-01"));
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .unwrap()
}
