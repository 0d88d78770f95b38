//! Request, outcome and context types for one synchronization call.

use record_sink::WriteMode;
use serde::{Deserialize, Serialize};
use sync_core::Record;
use tokio_util::sync::CancellationToken;

/// Per-request options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizeOptions {
    /// Fields never default-filled, on top of the configured ones
    #[serde(default)]
    pub ignore_fields: Vec<String>,

    /// Write semantics for accepted records
    #[serde(default)]
    pub operation: WriteMode,

    /// Validate and fill, but skip writes
    #[serde(default)]
    pub dry_run: bool,
}

/// A batch of records bound for one target collection.
///
/// ```json
/// { "target_type": "host", "records": [{"bk_host_id": 1}], "options": {"operation": "upsert"} }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynchronizeRequest {
    /// Record type; selects both the schema and the storage collection
    pub target_type: String,

    /// Records in input order
    #[serde(default)]
    pub records: Vec<Record>,

    #[serde(default)]
    pub options: SynchronizeOptions,
}

impl SynchronizeRequest {
    pub fn new(target_type: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            target_type: target_type.into(),
            records,
            options: SynchronizeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SynchronizeOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a synchronization call that was not aborted.
///
/// A record with no diagnostic was synchronized, unless `cancelled` is set.
/// In that case records after the cancellation point were not attempted, and
/// the one record whose write was in flight when the cancel arrived may or
/// may not have been stored. It is neither counted in `persisted` nor given
/// a diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizeOutcome {
    /// One entry per failed record, in batch order
    pub diagnostics: Vec<String>,

    /// Number of records written (or counted, in dry-run mode)
    pub persisted: usize,

    /// Whether the caller cancelled the call during Save
    pub cancelled: bool,
}

impl SynchronizeOutcome {
    /// Every record was synchronized.
    pub fn is_success(&self) -> bool {
        self.diagnostics.is_empty() && !self.cancelled
    }
}

/// Caller-side context for one call.
#[derive(Debug, Clone)]
pub struct SyncContext {
    /// Correlates log events of one call
    pub request_id: String,

    /// Cancelling aborts the remaining Save iterations
    pub cancel: CancellationToken,
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncContext {
    /// Context with a fresh request id and its own cancellation token.
    pub fn new() -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json_defaults() {
        let request: SynchronizeRequest =
            serde_json::from_str(r#"{"target_type":"host"}"#).unwrap();
        assert_eq!(request.target_type, "host");
        assert!(request.records.is_empty());
        assert_eq!(request.options, SynchronizeOptions::default());
    }

    #[test]
    fn test_request_json_options() {
        let request: SynchronizeRequest = serde_json::from_str(
            r#"{
                "target_type": "host",
                "records": [{"bk_host_id": 1}],
                "options": {"ignore_fields": ["bk_cpu"], "operation": "insert", "dry_run": true}
            }"#,
        )
        .unwrap();

        assert_eq!(request.records.len(), 1);
        assert_eq!(request.options.ignore_fields, vec!["bk_cpu"]);
        assert_eq!(request.options.operation, WriteMode::Insert);
        assert!(request.options.dry_run);
    }

    #[test]
    fn test_outcome_success() {
        assert!(SynchronizeOutcome::default().is_success());
        let cancelled = SynchronizeOutcome {
            cancelled: true,
            ..Default::default()
        };
        assert!(!cancelled.is_success());
    }

    #[test]
    fn test_contexts_get_distinct_ids() {
        assert_ne!(SyncContext::new().request_id, SyncContext::new().request_id);
        assert_eq!(SyncContext::new().with_request_id("r1").request_id, "r1");
    }
}
