use lawdelta_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using LawDeltaError
pub type Result<T> = std::result::Result<T, LawDeltaError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by the store, the engine or the CLI carries one of
/// these kinds. Each kind maps to a stable code for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Boundary validation
    /// Malformed caller input, including dates that are not `YYYY-MM-DD`
    InvalidInput,
    NotFound,
    AlreadyExists,

    // Update pipeline
    /// Caller's view of the old text no longer matches the stored text
    Concurrency,
    PolicyDenied,
    /// A uniqueness or integrity rule in the ledger was broken
    ConstraintViolation,
    InvariantViolation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::PolicyDenied => "ERR_POLICY_DENIED",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether retrying the same document later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Concurrency | ExErrorKind::Persistence | ExErrorKind::Io
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus whatever context the failing layer knew:
/// the operation, the document it was working on and correlation ids.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    version_number: Option<i64>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            version_number: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (document number, document id or amendment number)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_version_number(mut self, version_number: i64) -> Self {
        self.version_number = Some(version_number);
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn version_number(&self) -> Option<i64> {
        self.version_number
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(version_number) = self.version_number {
            write!(f, " (version: {})", version_number)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Typed failures raised by the pure layer and the boundary parsers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LawDeltaError {
    /// A date argument was not a valid `YYYY-MM-DD` calendar date
    #[error("Invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("Document not found: {document_number}")]
    DocumentNotFound { document_number: String },

    /// Caller supplied an old text that no longer matches the stored document
    #[error("Stale update for {document_number}: stored text has changed")]
    StaleUpdate { document_number: String },

    #[error("Version {version_number} already exists for document {document_id}")]
    DuplicateVersion {
        document_id: String,
        version_number: i64,
    },

    /// Version numbers for a document are not 1..=n
    #[error("Version sequence for document {document_id} has a gap before {version_number}")]
    VersionGap {
        document_id: String,
        version_number: i64,
    },

    #[error("Unknown {field} value: {value}")]
    UnknownEnumValue { field: String, value: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<LawDeltaError> for ExError {
    fn from(err: LawDeltaError) -> Self {
        match err {
            LawDeltaError::InvalidDate { input, reason } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_message(format!("'{}' is not a YYYY-MM-DD date: {}", input, reason))
            }
            LawDeltaError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }
            LawDeltaError::DocumentNotFound { document_number } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(document_number)
                    .with_message("Document not found")
            }
            LawDeltaError::StaleUpdate { document_number } => {
                ExError::new(ExErrorKind::Concurrency)
                    .with_entity_id(document_number)
                    .with_message("Supplied old text does not match the stored text")
            }
            LawDeltaError::DuplicateVersion {
                document_id,
                version_number,
            } => ExError::new(ExErrorKind::AlreadyExists)
                .with_entity_id(document_id)
                .with_version_number(version_number)
                .with_message("Version already archived"),
            LawDeltaError::VersionGap {
                document_id,
                version_number,
            } => ExError::new(ExErrorKind::InvariantViolation)
                .with_entity_id(document_id)
                .with_version_number(version_number)
                .with_message("Version numbers are not gapless"),
            LawDeltaError::UnknownEnumValue { field, value } => {
                ExError::new(ExErrorKind::Serialization)
                    .with_message(format!("Unknown {} value '{}'", field, value))
            }
            LawDeltaError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            LawDeltaError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for LawDeltaError {
    fn from(err: serde_json::Error) -> Self {
        LawDeltaError::Serialization {
            message: err.to_string(),
        }
    }
}
