use std::sync::Arc;

use record_sink::{RecordSink, SchemaSource};
use tracing::instrument;

use super::adapter::SynchronizeAdapter;
use super::error::SyncError;
use super::request::{SyncContext, SynchronizeOutcome, SynchronizeRequest};
use crate::config::SyncConfig;

/// Entry point for synchronizing batches into a [`RecordSink`].
///
/// Holds no per-call state, so one manager can serve concurrent calls.
#[derive(Clone)]
pub struct SynchronizeManager {
    sink: Arc<dyn RecordSink>,
    schemas: Arc<dyn SchemaSource>,
    config: SyncConfig,
}

impl SynchronizeManager {
    pub fn new(
        sink: Arc<dyn RecordSink>,
        schemas: Arc<dyn SchemaSource>,
        config: SyncConfig,
    ) -> Self {
        Self {
            sink,
            schemas,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run PreFilter, Save and Collect over one batch.
    ///
    /// Per-record failures are reported in the outcome's diagnostics; an
    /// `Err` means the call was aborted before anything was written.
    #[instrument(
        name = "synchronize",
        skip(self, ctx, request),
        fields(request_id = %ctx.request_id, target_type = %request.target_type)
    )]
    pub async fn synchronize(
        &self,
        ctx: &SyncContext,
        request: SynchronizeRequest,
    ) -> Result<SynchronizeOutcome, SyncError> {
        tracing::info!(records = request.records.len(), "Starting synchronization");

        let outcome = SynchronizeAdapter::new(
            request,
            self.sink.as_ref(),
            self.schemas.as_ref(),
            &self.config,
        )
        .pre_filter()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Synchronization aborted"))?
        .save(&ctx.cancel)
        .await
        .collect();

        tracing::info!(
            persisted = outcome.persisted,
            failed = outcome.diagnostics.len(),
            cancelled = outcome.cancelled,
            "Synchronization finished"
        );
        Ok(outcome)
    }
}
