//! Directory batch ingest command

use std::path::{Path, PathBuf};

use clap::Args;
use lawdelta_core::policy::NoopUpdatePolicyHook;
use lawdelta_engine::commands::batch::ingest_batch;
use lawdelta_engine::commands::ingest::DocumentUpdate;
use lawdelta_store::db;

use super::print_json;
use crate::config::Settings;

#[derive(Debug, Args)]
pub struct IngestBatchArgs {
    /// Directory of `*.json` update files, applied in file name order
    #[arg(long)]
    pub dir: PathBuf,

    /// Worker count (overrides the config file)
    #[arg(long)]
    pub workers: Option<usize>,
}

fn read_updates(dir: &Path) -> Result<Vec<DocumentUpdate>, Box<dyn std::error::Error>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    files
        .iter()
        .map(|path| -> Result<DocumentUpdate, Box<dyn std::error::Error>> {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)
                .map_err(|e| format!("{}: {}", path.display(), e).into())
        })
        .collect()
}

pub fn execute(
    args: IngestBatchArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let updates = read_updates(&args.dir)?;

    // Migrate once up front so workers do not race on schema creation.
    drop(db::open_ready(&settings.db_path)?);

    let report = ingest_batch(
        &settings.db_path,
        &updates,
        &settings.batch_options(args.workers),
        &NoopUpdatePolicyHook,
    );
    print_json(&report)?;

    if report.failed > 0 {
        return Err(format!("{} of {} documents failed", report.failed, report.items.len()).into());
    }
    Ok(())
}
