//! Engine-level read-only query surface.
//!
//! `apply_engine_query` takes a shared connection and never writes.

use chrono::NaiveDate;
use lawdelta_store::errors::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::commands::diff_api::{
    diff_between_on, history, version_at_on, LawDiff, LawHistory, LawVersion,
};

/// Read-only queries supported by the engine.
#[derive(Debug, Clone)]
pub enum EngineQuery {
    /// Amendment timeline of a base law.
    History { document_number: String },
    /// The document as it read on a date.
    VersionAt {
        document_number: String,
        date: NaiveDate,
    },
    /// Section differences between two dates.
    DiffBetween {
        document_number: String,
        from: NaiveDate,
        to: NaiveDate,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EngineQueryResult {
    History(LawHistory),
    VersionAt(LawVersion),
    DiffBetween(LawDiff),
}

/// Run a query as of `today`.
///
/// # Errors
///
/// `NotFound` for an unknown document number, `Persistence` on database failure.
pub fn apply_engine_query(
    query: EngineQuery,
    conn: &Connection,
    today: NaiveDate,
) -> Result<EngineQueryResult> {
    match query {
        EngineQuery::History { document_number } => {
            history(conn, &document_number).map(EngineQueryResult::History)
        }
        EngineQuery::VersionAt {
            document_number,
            date,
        } => version_at_on(conn, &document_number, date, today).map(EngineQueryResult::VersionAt),
        EngineQuery::DiffBetween {
            document_number,
            from,
            to,
        } => diff_between_on(conn, &document_number, from, to, today)
            .map(EngineQueryResult::DiffBetween),
    }
}
