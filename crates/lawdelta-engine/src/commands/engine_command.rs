//! Engine-level write commands.

use lawdelta_core::policy::UpdatePolicyHook;
use lawdelta_store::errors::Result;
use rusqlite::Connection;

use crate::commands::ingest::{
    apply_update, record_repeal, DocumentUpdate, IngestOptions, UpdateReport,
};

/// Commands that write to the database
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Run one update through the archive/classify/record pipeline.
    ApplyUpdate {
        update: Box<DocumentUpdate>,
        options: IngestOptions,
    },
    /// Mark a document repealed, optionally naming the repealing instrument.
    RecordRepeal {
        document_number: String,
        repealed_by: Option<String>,
    },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    ApplyUpdate(UpdateReport),
    RecordRepeal(UpdateReport),
}

impl EngineCommandResult {
    pub fn report(&self) -> &UpdateReport {
        match self {
            EngineCommandResult::ApplyUpdate(r) | EngineCommandResult::RecordRepeal(r) => r,
        }
    }
}

/// Apply an engine command under a policy hook.
///
/// # Errors
///
/// Whatever the underlying operation returns; nothing is written on error.
pub fn apply_engine_command(
    cmd: EngineCommand,
    conn: &mut Connection,
    policy_hook: &dyn UpdatePolicyHook,
) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::ApplyUpdate { update, options } => {
            apply_update(conn, &update, &options, policy_hook).map(EngineCommandResult::ApplyUpdate)
        }
        EngineCommand::RecordRepeal {
            document_number,
            repealed_by,
        } => record_repeal(conn, &document_number, repealed_by.as_deref(), policy_hook)
            .map(EngineCommandResult::RecordRepeal),
    }
}
