//! Batch synchronization: validate, default-fill and persist records.

mod adapter;
mod error;
mod manager;
mod request;
mod validate;

pub use adapter::{Filtered, Initial, Persisted, SynchronizeAdapter};
pub use error::{RecordError, SyncError};
pub use manager::SynchronizeManager;
pub use request::{SyncContext, SynchronizeOptions, SynchronizeOutcome, SynchronizeRequest};
