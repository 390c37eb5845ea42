//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by a storage collaborator.
///
/// Adapters classify their native errors into these kinds; the account
/// factory passes them through untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. a second account
    /// with the same email)
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Any other constraint (check, not-null) rejected the write
    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was absent or empty
    #[error("The {0} field must be set")]
    MissingField(&'static str),

    /// A field value could not be normalized or has the wrong shape
    #[error("Invalid {field}: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The record would break an account invariant (superuser implies staff)
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// Extra field that the account record does not have
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Field that cannot be supplied through extra fields
    #[error("Field {0} cannot be set through extra fields")]
    ReservedField(String),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid format error
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invariant violation error
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// True when storage rejected the write because the key already exists
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::Storage(StoreError::DuplicateKey(_)))
    }

    /// Stable snake_case tag, safe to record in the audit log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidFormat { .. } => "invalid_format",
            Self::InvariantViolation(_) => "invariant_violation",
            Self::UnknownField(_) => "unknown_field",
            Self::ReservedField(_) => "reserved_field",
            Self::Storage(StoreError::DuplicateKey(_)) => "duplicate_key",
            Self::Storage(StoreError::Constraint(_)) => "constraint_violation",
            Self::Storage(StoreError::Database(_)) => "database",
            Self::Hashing(_) => "hashing",
            Self::NotFound(_) => "not_found",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result used for `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            error_kind: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self {
                error_kind: Some(e.kind().to_string()),
                ..Self::fail(e.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_result_ok() {
        let result: OperationResult<i32> = OperationResult::ok(42);
        assert!(result.success);
        assert_eq!(result.data, Some(42));
        assert!(result.error.is_none());
    }

    #[test]
    fn test_from_error_carries_kind() {
        let err: Result<i32> = Err(Error::MissingField("email"));
        let result: OperationResult<i32> = err.into();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("The email field must be set"));
        assert_eq!(result.error_kind.as_deref(), Some("missing_field"));
    }

    #[test]
    fn test_storage_errors_keep_their_kind() {
        let err = Error::from(StoreError::DuplicateKey("email: a@b.com".to_string()));
        assert!(err.is_duplicate_key());
        assert_eq!(err.kind(), "duplicate_key");
        assert_eq!(err.to_string(), "Duplicate key: email: a@b.com");

        let err = Error::from(StoreError::Constraint("check failed".to_string()));
        assert!(!err.is_duplicate_key());
        assert_eq!(err.kind(), "constraint_violation");
    }
}
