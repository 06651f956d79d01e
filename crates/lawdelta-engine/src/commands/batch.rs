//! Bounded-parallel batch ingestion
//!
//! Each worker owns its own connection and pulls the next update from a
//! shared cursor, so one document is only ever written by one worker. A
//! failing document is reported and the rest of the batch carries on.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use lawdelta_core::errors::{ExError, ExErrorKind};
use lawdelta_core::policy::UpdatePolicyHook;
use lawdelta_core::{log_op_end, log_op_start};
use lawdelta_core_types::{RequestContext, TraceId};
use lawdelta_store::db;
use lawdelta_store::errors::Result;
use rusqlite::Connection;
use serde::Serialize;

use crate::commands::ingest::{
    apply_update, DocumentUpdate, IngestOptions, UpdateReport, UpdateStatus,
};

pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Upper bound on concurrent workers (at least one is used)
    pub workers: usize,
    pub ingest: IngestOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            ingest: IngestOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpdate {
    pub code: String,
    pub message: String,
}

impl From<&ExError> for FailedUpdate {
    fn from(err: &ExError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum BatchOutcome {
    Applied(UpdateReport),
    Failed(FailedUpdate),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemReport {
    pub document_number: String,
    pub request_id: String,
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub trace_id: String,
    /// In input order
    pub items: Vec<BatchItemReport>,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl BatchReport {
    fn tally(trace_id: &TraceId, items: Vec<BatchItemReport>) -> Self {
        let mut report = Self {
            trace_id: trace_id.to_string(),
            items: Vec::new(),
            created: 0,
            updated: 0,
            unchanged: 0,
            failed: 0,
        };
        for item in &items {
            match &item.outcome {
                BatchOutcome::Applied(r) => match r.status {
                    UpdateStatus::Created => report.created += 1,
                    UpdateStatus::Updated => report.updated += 1,
                    UpdateStatus::Unchanged => report.unchanged += 1,
                },
                BatchOutcome::Failed(_) => report.failed += 1,
            }
        }
        report.items = items;
        report
    }
}

/// Apply `updates` against the database at `db_path` with up to
/// `options.workers` threads.
///
/// Never fails as a whole: per-document errors, including a worker that
/// cannot open the database, are reported in [`BatchReport::items`].
pub fn ingest_batch(
    db_path: &Path,
    updates: &[DocumentUpdate],
    options: &BatchOptions,
    policy_hook: &dyn UpdatePolicyHook,
) -> BatchReport {
    let trace_id = TraceId::new();
    let workers = options.workers.clamp(1, updates.len().max(1));

    log_op_start!(
        "ingest_batch",
        trace_id = trace_id.as_str(),
        document_count = updates.len(),
        workers = workers
    );
    let start = std::time::Instant::now();

    let cursor = AtomicUsize::new(0);
    let mut slots: Vec<Option<BatchItemReport>> = vec![None; updates.len()];

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let cursor = &cursor;
                let trace_id = &trace_id;
                scope.spawn(move || {
                    run_worker(worker, db_path, updates, cursor, trace_id, options, policy_hook)
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(done) => {
                    for (index, item) in done {
                        slots[index] = Some(item);
                    }
                }
                Err(_) => tracing::error!(trace_id = trace_id.as_str(), "batch worker panicked"),
            }
        }
    });

    let items = slots
        .into_iter()
        .zip(updates)
        .map(|(slot, update)| {
            slot.unwrap_or_else(|| {
                let err = ExError::new(ExErrorKind::Internal)
                    .with_entity_id(update.document_number.as_str())
                    .with_message("worker stopped before processing this document");
                BatchItemReport {
                    document_number: update.document_number.clone(),
                    request_id: String::new(),
                    outcome: BatchOutcome::Failed((&err).into()),
                }
            })
        })
        .collect();
    let report = BatchReport::tally(&trace_id, items);

    log_op_end!(
        "ingest_batch",
        duration_ms = start.elapsed().as_millis() as u64,
        trace_id = trace_id.as_str(),
        created = report.created,
        updated = report.updated,
        unchanged = report.unchanged,
        failed = report.failed
    );
    report
}

fn run_worker(
    worker: usize,
    db_path: &Path,
    updates: &[DocumentUpdate],
    cursor: &AtomicUsize,
    trace_id: &TraceId,
    options: &BatchOptions,
    policy_hook: &dyn UpdatePolicyHook,
) -> Vec<(usize, BatchItemReport)> {
    let mut done = Vec::new();
    let mut conn: Option<Connection> = None;

    loop {
        let index = cursor.fetch_add(1, Ordering::Relaxed);
        let Some(update) = updates.get(index) else {
            break;
        };
        let ctx = RequestContext::within(trace_id);

        let outcome = match process(&mut conn, db_path, update, options, policy_hook) {
            Ok(report) => BatchOutcome::Applied(report),
            Err(e) => {
                let e = e
                    .with_request_id(ctx.request_id.clone())
                    .with_trace_id(trace_id.clone());
                tracing::warn!(
                    worker,
                    document_number = update.document_number.as_str(),
                    request_id = ctx.request_id.as_str(),
                    err_code = e.code(),
                    "document failed, continuing batch"
                );
                BatchOutcome::Failed((&e).into())
            }
        };

        done.push((
            index,
            BatchItemReport {
                document_number: update.document_number.clone(),
                request_id: ctx.request_id.to_string(),
                outcome,
            },
        ));
    }
    done
}

/// Opens the worker's connection on first use, so an unreachable database
/// fails documents instead of the worker.
fn process(
    conn: &mut Option<Connection>,
    db_path: &Path,
    update: &DocumentUpdate,
    options: &BatchOptions,
    policy_hook: &dyn UpdatePolicyHook,
) -> Result<UpdateReport> {
    if conn.is_none() {
        *conn = Some(db::open_ready(db_path)?);
    }
    match conn {
        Some(c) => apply_update(c, update, &options.ingest, policy_hook),
        None => Err(ExError::new(ExErrorKind::Internal).with_message("no database connection")),
    }
}
