//! Canonical schema constants for structured logging
//!
//! Field keys are shared by every crate so that log queries can rely on a
//! single spelling per concept.

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Entity identifiers
pub const FIELD_DOCUMENT_NUMBER: &str = "document_number";
pub const FIELD_DOCUMENT_ID: &str = "document_id";
pub const FIELD_VERSION_NUMBER: &str = "version_number";
pub const FIELD_AMENDMENT_NUMBER: &str = "amendment_number";

// Collection sizes
pub const FIELD_SECTION_COUNT: &str = "section_count";
pub const FIELD_CHANGE_COUNT: &str = "change_count";

pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_entity_fields_are_distinct() {
        let fields = [
            FIELD_DOCUMENT_NUMBER,
            FIELD_DOCUMENT_ID,
            FIELD_VERSION_NUMBER,
            FIELD_AMENDMENT_NUMBER,
        ];
        for (i, a) in fields.iter().enumerate() {
            for b in &fields[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
