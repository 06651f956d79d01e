//! Text diffing
//!
//! ## Entry points
//!
//! ```
//! use lawdelta_core::diff::{compute_diff, generate_unified_diff, has_substantive_changes};
//!
//! let result = compute_diff("a\nb\n", "a\nc\n");
//! assert_eq!(result.summary, "+1 lines, -1 lines (66.7% changed)");
//! assert!(generate_unified_diff("a\nb\n", "a\nc\n", 3).contains("@@ -1,2 +1,2 @@"));
//! assert!(!has_substantive_changes("Some   text", "Some text"));
//! ```
//!
//! Lines are compared exactly; a trailing newline does not start an extra
//! line. Whitespace-insensitive comparison is only done by
//! [`has_substantive_changes`].

pub mod engine;
pub mod myers;
pub mod normalize;
pub mod unified;
pub mod words;

pub use engine::{compute_diff, DiffResult};
pub use myers::Edit;
pub use normalize::has_substantive_changes;
pub use unified::generate_unified_diff;
pub use words::{compare_words, WordChunk, WordChunkKind};
