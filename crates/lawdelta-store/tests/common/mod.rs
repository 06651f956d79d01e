#![allow(dead_code, clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use lawdelta_core::model::{ContentType, DocumentStatus, LegalDocument};
use lawdelta_store::db;
use lawdelta_store::migrations::apply_migrations;
use lawdelta_store::repo::DocumentRepo;
use rusqlite::Connection;

pub fn setup() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    db::configure(&conn).unwrap();
    apply_migrations(&mut conn).unwrap();
    conn
}

pub fn document(number: &str, text: &str) -> LegalDocument {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    LegalDocument {
        id: format!("doc-{}", number.replace([' ', ':'], "-")),
        document_number: number.to_string(),
        title: format!("Lag {}", number),
        content_type: ContentType::SfsLaw,
        full_text: text.to_string(),
        markup: None,
        status: DocumentStatus::Active,
        publication_date: None,
        last_change_type: None,
        last_change_ref: None,
        last_change_at: None,
        created_at: at,
        updated_at: at,
    }
}

pub fn insert_document(conn: &Connection, number: &str, text: &str) -> LegalDocument {
    let doc = document(number, text);
    DocumentRepo::insert(conn, &doc).unwrap();
    doc
}
