//! RecordSync Library
//!
//! Schema-driven normalization and synchronization of record batches.
//!
//! # Features
//!
//! - Per-record validation: identity and type checks against the target's schema
//! - Default filling: missing declared fields get a type-appropriate default
//! - Partial success: one bad record never aborts the batch
//! - Cancellation: callers can stop a batch between writes
//!
//! # CLI Usage
//!
//! ```bash
//! # Synchronize a request file into JSON Lines collections
//! record-sync sync --schema objects.yaml --request batch.json --output-dir ./data
//!
//! # Show what default filling does to one record
//! record-sync fill --schema objects.yaml --object host --input record.json
//! ```

pub mod config;
pub mod synchronize;

pub use config::{SyncConfig, SyncOpts};
pub use synchronize::{
    RecordError, SyncContext, SyncError, SynchronizeAdapter, SynchronizeManager,
    SynchronizeOptions, SynchronizeOutcome, SynchronizeRequest,
};
