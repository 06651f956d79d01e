//! Core types shared across lawdelta crates
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Schema constants**: Canonical field keys and event names used by the
//!   logging facility and the change-event ledger

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, TraceId};
