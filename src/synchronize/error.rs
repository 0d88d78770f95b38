//! Error taxonomy for synchronization calls.
//!
//! [`SyncError`] is a call-level failure: nothing meaningful was completed
//! and no diagnostics are returned. [`RecordError`] is a per-record failure;
//! it only ever surfaces as a diagnostic string.

use sync_core::{DefaultsError, FieldType};

/// Fatal error for a whole synchronization call.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The request itself cannot be processed
    #[error("Malformed synchronize request: {0}")]
    MalformedRequest(String),

    /// The schema collaborator could not supply the target's schema
    #[error("Schema for '{target}' is unavailable: {source:#}")]
    SchemaUnavailable {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    /// The schema was loaded but its option metadata is unusable
    #[error("Schema for '{target}' is invalid: {source}")]
    InvalidSchema {
        target: String,
        #[source]
        source: DefaultsError,
    },

    /// The storage collaborator is unreachable
    #[error("Storage is unavailable: {0:#}")]
    StorageUnavailable(#[source] anyhow::Error),
}

/// Why one record was not synchronized.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record has no fields")]
    Empty,

    #[error("missing identity field '{field}'")]
    MissingIdentity { field: String },

    #[error("identity field '{field}' must be a string or number, got {found}")]
    InvalidIdentity { field: String, found: &'static str },

    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: &'static str,
    },

    #[error("write failed: {0:#}")]
    Write(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_messages() {
        let err = RecordError::TypeMismatch {
            field: "bk_cpu".to_string(),
            expected: FieldType::Int,
            found: "string",
        };
        assert_eq!(err.to_string(), "field 'bk_cpu' expects int, got string");

        let err = RecordError::Write(anyhow::anyhow!("disk full").context("append host.jsonl"));
        assert_eq!(err.to_string(), "write failed: append host.jsonl: disk full");
    }

    #[test]
    fn test_sync_error_messages() {
        let err = SyncError::StorageUnavailable(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Storage is unavailable: connection refused");
    }
}
