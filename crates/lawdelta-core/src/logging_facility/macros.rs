//! Operation boundary macros
//!
//! An engine operation emits one `start` event and then exactly one `end` or
//! `end_error` event. All three carry `component`, `op` and `event`; any
//! trailing `key = value` pairs are handed to `tracing` unchanged.

/// Start of an operation
///
/// ```
/// # use lawdelta_core::log_op_start;
/// log_op_start!("apply_update", document_number = "SFS 1998:808");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)+)?) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($($field)+)?
        );
    }};
}

/// Successful end of an operation, with its duration
///
/// ```
/// # use lawdelta_core::log_op_end;
/// log_op_end!("history", duration_ms = 3_u64, amendment_count = 2);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)+)?
        );
    }};
}

/// Failed end of an operation
///
/// `$err` is anything convertible into `ExError`; its kind and stable code
/// are logged as `err_kind` and `err_code`.
///
/// ```
/// # use lawdelta_core::{log_op_error, errors::LawDeltaError};
/// let err = LawDeltaError::DocumentNotFound { document_number: "SFS 1".to_string() };
/// log_op_error!("version_at", err, duration_ms = 1_u64, document_number = "SFS 1");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)+)?) => {{
        let failure: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?failure.kind(),
            err_code = failure.code(),
            $($($field)+)?
        );
    }};
}
