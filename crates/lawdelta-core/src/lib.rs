//! lawdelta core
//!
//! Pure transforms over statute text: section parsing, line and word
//! diffing, change classification and point-in-time reconstruction, plus
//! the error and logging facilities shared by the other crates. Nothing in
//! here touches storage.

pub mod classify;
pub mod dates;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod parser;
pub mod policy;
pub mod reconstruct;
pub mod registry;

pub use errors::{ExError, ExErrorKind, LawDeltaError, Result};
pub use lawdelta_core_types::schema;
