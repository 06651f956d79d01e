//! Read commands: history, version, diff

use chrono::{NaiveDate, Utc};
use clap::Args;
use lawdelta_engine::commands::engine_query::{apply_engine_query, EngineQuery};
use lawdelta_store::db;

use super::{parse_date_arg, print_json};
use crate::config::Settings;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Document number, e.g. "SFS 1998:808"
    pub document: String,
}

#[derive(Debug, Args)]
pub struct VersionArgs {
    pub document: String,

    /// YYYY-MM-DD
    #[arg(long, value_parser = parse_date_arg)]
    pub date: NaiveDate,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    pub document: String,

    /// YYYY-MM-DD
    #[arg(long, value_parser = parse_date_arg)]
    pub from: NaiveDate,

    /// YYYY-MM-DD
    #[arg(long, value_parser = parse_date_arg)]
    pub to: NaiveDate,
}

fn run(query: EngineQuery, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let conn = db::open_ready(&settings.db_path)?;
    let result = apply_engine_query(query, &conn, Utc::now().date_naive())?;
    print_json(&result)
}

pub fn execute_history(
    args: HistoryArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    run(
        EngineQuery::History {
            document_number: args.document,
        },
        settings,
    )
}

pub fn execute_version(
    args: VersionArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    run(
        EngineQuery::VersionAt {
            document_number: args.document,
            date: args.date,
        },
        settings,
    )
}

pub fn execute_diff(args: DiffArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    run(
        EngineQuery::DiffBetween {
            document_number: args.document,
            from: args.from,
            to: args.to,
        },
        settings,
    )
}
