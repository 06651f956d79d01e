//! lawdelta engine: orchestration layer
//!
//! Coordinates the pure transforms in `lawdelta-core` with the ledgers in
//! `lawdelta-store`: the transactional update pipeline, batch ingestion and
//! the point-in-time read paths.

pub mod commands;
