//! Single-document ingest command

use std::path::PathBuf;

use clap::Args;
use lawdelta_core::policy::NoopUpdatePolicyHook;
use lawdelta_engine::commands::engine_command::{apply_engine_command, EngineCommand};
use lawdelta_engine::commands::ingest::DocumentUpdate;
use lawdelta_store::db;

use super::print_json;
use crate::config::Settings;

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// JSON file holding one document update (camelCase keys)
    pub file: PathBuf,
}

pub fn execute(args: IngestArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(&args.file)?;
    let update: DocumentUpdate = serde_json::from_str(&raw)?;

    let mut conn = db::open_ready(&settings.db_path)?;
    let cmd = EngineCommand::ApplyUpdate {
        update: Box::new(update),
        options: settings.ingest.clone(),
    };
    let result = apply_engine_command(cmd, &mut conn, &NoopUpdatePolicyHook)?;

    print_json(result.report())
}
