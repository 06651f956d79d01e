//! Repeal command

use clap::Args;
use lawdelta_core::policy::NoopUpdatePolicyHook;
use lawdelta_engine::commands::engine_command::{apply_engine_command, EngineCommand};
use lawdelta_store::db;

use super::print_json;
use crate::config::Settings;

#[derive(Debug, Args)]
pub struct RepealArgs {
    pub document: String,

    /// Repealing instrument, e.g. "SFS 2025:100"
    #[arg(long)]
    pub by: Option<String>,
}

pub fn execute(args: RepealArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = db::open_ready(&settings.db_path)?;
    let cmd = EngineCommand::RecordRepeal {
        document_number: args.document,
        repealed_by: args.by,
    };
    let result = apply_engine_command(cmd, &mut conn, &NoopUpdatePolicyHook)?;
    print_json(result.report())
}
