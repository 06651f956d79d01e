//! Update policy hooks
//!
//! A hook is consulted inside the update transaction after every ledger row
//! has been written and before the document text is overwritten. Returning
//! an error aborts the transaction, so nothing from that update persists.

use crate::errors::{ExError, ExErrorKind};
use crate::model::ChangeEventKind;

/// What the hook gets to see about a pending update
#[derive(Debug, Clone, Copy)]
pub struct PendingUpdate<'a> {
    pub document_number: &'a str,
    pub event_kind: Option<ChangeEventKind>,
    pub amendment_number: Option<&'a str>,
    pub section_change_count: usize,
}

pub trait UpdatePolicyHook: Send + Sync {
    /// Decide whether the pending update may be committed.
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::PolicyDenied` if the update must not be committed.
    fn check(&self, update: &PendingUpdate<'_>) -> std::result::Result<(), ExError>;
}

/// Always allows.
pub struct NoopUpdatePolicyHook;

impl UpdatePolicyHook for NoopUpdatePolicyHook {
    fn check(&self, _: &PendingUpdate<'_>) -> std::result::Result<(), ExError> {
        Ok(())
    }
}

/// Always denies.
pub struct DenyAllUpdatePolicyHook;

impl UpdatePolicyHook for DenyAllUpdatePolicyHook {
    fn check(&self, update: &PendingUpdate<'_>) -> std::result::Result<(), ExError> {
        Err(ExError::new(ExErrorKind::PolicyDenied)
            .with_entity_id(update.document_number)
            .with_message("DenyAll policy hook"))
    }
}

/// Denies updates that would change more sections than `max_changes` in one
/// go without naming an amending instrument.
pub struct UnattributedChangeGuard {
    pub max_changes: usize,
}

impl UpdatePolicyHook for UnattributedChangeGuard {
    fn check(&self, update: &PendingUpdate<'_>) -> std::result::Result<(), ExError> {
        if update.amendment_number.is_none() && update.section_change_count > self.max_changes {
            return Err(ExError::new(ExErrorKind::PolicyDenied)
                .with_entity_id(update.document_number)
                .with_message(format!(
                    "{} section changes without an amending instrument",
                    update.section_change_count
                )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(amendment: Option<&str>, count: usize) -> PendingUpdate<'_> {
        PendingUpdate {
            document_number: "SFS 1998:808",
            event_kind: Some(ChangeEventKind::AmendmentDetected),
            amendment_number: amendment,
            section_change_count: count,
        }
    }

    #[test]
    fn test_noop_allows() {
        assert!(NoopUpdatePolicyHook.check(&pending(None, 3)).is_ok());
    }

    #[test]
    fn test_deny_all_denies() {
        let err = DenyAllUpdatePolicyHook
            .check(&pending(Some("SFS 2025:1"), 1))
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PolicyDenied);
        assert_eq!(err.entity_id(), Some("SFS 1998:808"));
    }

    #[test]
    fn test_unattributed_guard() {
        let guard = UnattributedChangeGuard { max_changes: 2 };
        assert!(guard.check(&pending(None, 2)).is_ok());
        assert!(guard.check(&pending(Some("SFS 2025:1"), 10)).is_ok());
        assert_eq!(
            guard.check(&pending(None, 3)).unwrap_err().kind(),
            ExErrorKind::PolicyDenied
        );
    }
}
