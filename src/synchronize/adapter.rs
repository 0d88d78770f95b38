//! Three-phase synchronization over one batch.
//!
//! ```text
//! Initial --pre_filter--> Filtered --save--> Persisted --collect--> SynchronizeOutcome
//! ```
//!
//! Each phase consumes the adapter and returns it in the next state, so no
//! phase can run twice or out of order.

use record_sink::{RecordSink, SchemaSource};
use sync_core::{DefaultValueFiller, FieldType, ObjectSchema, OptionCodec, Record};
use tokio_util::sync::CancellationToken;

use super::error::{RecordError, SyncError};
use super::request::{SynchronizeOutcome, SynchronizeRequest};
use super::validate::{identity_label, normalize_record};
use crate::config::SyncConfig;

/// Before PreFilter.
pub struct Initial;

/// After PreFilter: records accepted for persistence.
pub struct Filtered {
    id_field: String,
    accepted: Vec<(usize, Record)>,
}

/// After Save.
pub struct Persisted {
    persisted: usize,
    cancelled: bool,
}

/// Per-record failure, keyed by 0-based batch position.
struct Diagnostic {
    position: usize,
    message: String,
}

/// Stateful driver for one synchronization call.
///
/// Owns the working copy of the batch and the diagnostics collected so far.
pub struct SynchronizeAdapter<'a, S = Initial> {
    request: SynchronizeRequest,
    sink: &'a dyn RecordSink,
    schemas: &'a dyn SchemaSource,
    config: &'a SyncConfig,
    diagnostics: Vec<Diagnostic>,
    state: S,
}

impl<'a, S> SynchronizeAdapter<'a, S> {
    fn advance<T>(self, state: T) -> SynchronizeAdapter<'a, T> {
        SynchronizeAdapter {
            request: self.request,
            sink: self.sink,
            schemas: self.schemas,
            config: self.config,
            diagnostics: self.diagnostics,
            state,
        }
    }

    fn record_failure(&mut self, position: usize, identity: &str, id_field: &str, err: RecordError) {
        tracing::warn!(
            position = position + 1,
            identity,
            error = %err,
            "Record rejected"
        );
        self.diagnostics.push(Diagnostic {
            position,
            message: format!("record {} ({id_field}={identity}): {err}", position + 1),
        });
    }

    fn dry_run(&self) -> bool {
        self.config.dry_run || self.request.options.dry_run
    }
}

impl<'a> SynchronizeAdapter<'a, Initial> {
    pub fn new(
        request: SynchronizeRequest,
        sink: &'a dyn RecordSink,
        schemas: &'a dyn SchemaSource,
        config: &'a SyncConfig,
    ) -> Self {
        Self {
            request,
            sink,
            schemas,
            config,
            diagnostics: Vec::new(),
            state: Initial,
        }
    }

    /// Validate, coerce and default-fill every record.
    ///
    /// Rejected records get a diagnostic and are dropped from the batch.
    /// Fails as a whole when the request, schema or storage is unusable.
    pub async fn pre_filter(mut self) -> Result<SynchronizeAdapter<'a, Filtered>, SyncError> {
        let target = self.request.target_type.trim().to_string();
        if target.is_empty() {
            return Err(SyncError::MalformedRequest(
                "target_type must not be empty".to_string(),
            ));
        }

        let schema = self
            .schemas
            .load_schema(&target)
            .await
            .map_err(|source| SyncError::SchemaUnavailable {
                target: target.clone(),
                source,
            })?;

        let codec = OptionCodec::new(self.config.enum_decode_policy);
        check_enum_options(&codec, &schema).map_err(|source| SyncError::InvalidSchema {
            target: target.clone(),
            source,
        })?;

        if !self.dry_run() {
            self.sink
                .check_connection()
                .await
                .map_err(SyncError::StorageUnavailable)?;
        }

        let filler = DefaultValueFiller::new(codec, self.config.default_table.clone());
        let mut ignore_fields = self.config.default_ignore_fields.clone();
        ignore_fields.extend(self.request.options.ignore_fields.iter().cloned());

        let records = std::mem::take(&mut self.request.records);
        let total = records.len();
        let mut accepted = Vec::with_capacity(total);

        for (position, mut record) in records.into_iter().enumerate() {
            if let Err(err) = normalize_record(&mut record, &schema) {
                let identity = identity_label(&record, &schema.id_field);
                self.record_failure(position, &identity, &schema.id_field, err);
                continue;
            }

            let report = filler
                .fill_missing_fields(&mut record, &schema.attributes, &ignore_fields)
                .map_err(|source| SyncError::InvalidSchema {
                    target: target.clone(),
                    source,
                })?;
            tracing::debug!(
                position = position + 1,
                filled = report.filled.len(),
                "Record accepted"
            );
            accepted.push((position, record));
        }

        tracing::info!(
            target_type = %target,
            total,
            accepted = accepted.len(),
            rejected = total - accepted.len(),
            "PreFilter complete"
        );

        self.request.target_type = target;
        Ok(self.advance(Filtered {
            id_field: schema.id_field,
            accepted,
        }))
    }
}

/// Decode every enum option once up front so a strict-policy failure
/// aborts before any record is touched.
fn check_enum_options(
    codec: &OptionCodec,
    schema: &ObjectSchema,
) -> Result<(), sync_core::DefaultsError> {
    for attribute in schema
        .attributes
        .iter()
        .filter(|a| a.property_type == FieldType::Enum)
    {
        codec.parse_enum_option(&attribute.option).map_err(|source| {
            sync_core::DefaultsError::InvalidEnumOption {
                property_id: attribute.property_id.clone(),
                source,
            }
        })?;
    }
    Ok(())
}

impl<'a> SynchronizeAdapter<'a, Filtered> {
    /// Number of records that survived PreFilter.
    pub fn accepted_len(&self) -> usize {
        self.state.accepted.len()
    }

    /// Write accepted records one at a time, in batch order.
    ///
    /// A failed write becomes a diagnostic for that record only. Cancelling
    /// `cancel` stops the loop: later records are not attempted, and a write
    /// still in flight is dropped without being counted or diagnosed.
    pub async fn save(mut self, cancel: &CancellationToken) -> SynchronizeAdapter<'a, Persisted> {
        let accepted = std::mem::take(&mut self.state.accepted);
        let id_field = std::mem::take(&mut self.state.id_field);
        let target = self.request.target_type.clone();
        let mode = self.request.options.operation;
        let dry_run = self.dry_run();

        let mut persisted = 0;
        let mut cancelled = false;

        for (position, record) in accepted {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            if dry_run {
                persisted += 1;
                continue;
            }

            let write = self
                .sink
                .write_records(&target, std::slice::from_ref(&record), mode);
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(
                        position = position + 1,
                        identity = %identity_label(&record, &id_field),
                        "Write abandoned on cancellation, its result is unknown"
                    );
                    cancelled = true;
                    break;
                }
                result = write => result,
            };

            match result {
                Ok(()) => persisted += 1,
                Err(e) => {
                    let identity = identity_label(&record, &id_field);
                    self.record_failure(position, &identity, &id_field, RecordError::Write(e));
                }
            }
        }

        if cancelled {
            tracing::warn!(target_type = %target, persisted, "Save cancelled");
        } else {
            tracing::info!(target_type = %target, persisted, dry_run, "Save complete");
        }

        self.advance(Persisted {
            persisted,
            cancelled,
        })
    }
}

impl SynchronizeAdapter<'_, Persisted> {
    /// Diagnostics in batch order, plus persistence totals.
    pub fn collect(mut self) -> SynchronizeOutcome {
        self.diagnostics.sort_by_key(|d| d.position);
        SynchronizeOutcome {
            diagnostics: self.diagnostics.into_iter().map(|d| d.message).collect(),
            persisted: self.state.persisted,
            cancelled: self.state.cancelled,
        }
    }
}
