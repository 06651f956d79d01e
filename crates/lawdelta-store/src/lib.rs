//! lawdelta store: SQLite persistence
//!
//! Provides:
//! - SQLite schema with a checksummed migrations framework
//! - The version archive (gapless per-document snapshots)
//! - The amendment registry
//! - Append-only section change and change event ledgers
//! - The document repository

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

pub use errors::Result;
