#![allow(clippy::unwrap_used, clippy::expect_used)]

use lawdelta_core::dates::parse_iso_date;
use lawdelta_core::errors::{ExError, ExErrorKind, LawDeltaError};

#[test]
fn test_not_found_verifiable_by_kind() {
    let ex_err: ExError = LawDeltaError::DocumentNotFound {
        document_number: "SFS 1900:1".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.entity_id(), Some("SFS 1900:1"));
    assert!(!ex_err.kind().is_retryable());
}

#[test]
fn test_invalid_date_is_invalid_input() {
    let err = parse_iso_date("2024-02-30").unwrap_err();
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert!(ex_err.message().contains("2024-02-30"));
}

#[test]
fn test_duplicate_version_carries_version_number() {
    let ex_err: ExError = LawDeltaError::DuplicateVersion {
        document_id: "doc-1".to_string(),
        version_number: 4,
    }
    .into();
    assert_eq!(ex_err.kind(), ExErrorKind::AlreadyExists);
    assert_eq!(ex_err.version_number(), Some(4));
    assert_eq!(ex_err.entity_id(), Some("doc-1"));
}

#[test]
fn test_version_gap_is_an_invariant_violation() {
    let ex_err: ExError = LawDeltaError::VersionGap {
        document_id: "doc-1".to_string(),
        version_number: 3,
    }
    .into();
    assert_eq!(ex_err.kind(), ExErrorKind::InvariantViolation);
    assert_eq!(ex_err.code(), "ERR_INVARIANT_VIOLATION");
}

#[test]
fn test_unknown_enum_value_is_serialization() {
    let err = "TREATY".parse::<lawdelta_core::model::ContentType>().unwrap_err();
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::Serialization);
    assert!(ex_err.message().contains("TREATY"));
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = [
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::AlreadyExists, "ERR_ALREADY_EXISTS"),
        (ExErrorKind::Concurrency, "ERR_CONCURRENCY"),
        (ExErrorKind::PolicyDenied, "ERR_POLICY_DENIED"),
        (ExErrorKind::ConstraintViolation, "ERR_CONSTRAINT_VIOLATION"),
        (ExErrorKind::InvariantViolation, "ERR_INVARIANT_VIOLATION"),
        (ExErrorKind::Io, "ERR_IO"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::Persistence, "ERR_PERSISTENCE"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}

#[test]
fn test_builder_preserves_correlation_ids() {
    let trace = lawdelta_core_types::TraceId::new();
    let ctx = lawdelta_core_types::RequestContext::within(&trace);
    let err = ExError::new(ExErrorKind::Persistence)
        .with_op("apply_update")
        .with_request_id(ctx.request_id.clone())
        .with_trace_id(trace.clone());
    assert_eq!(err.op(), Some("apply_update"));
    assert_eq!(err.request_id(), Some(&ctx.request_id));
    assert_eq!(err.trace_id(), Some(&trace));
    assert_eq!(ctx.trace_id.as_ref(), Some(&trace));
}
