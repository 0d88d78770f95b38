//! Storage and schema collaborators for record-sync.
//!
//! This crate defines the two seams the synchronization pipeline talks to:
//!
//! - [`RecordSink`] - writes records to a target collection
//! - [`SchemaSource`] - supplies the attribute schema of a record type
//!
//! Two sinks ship with it: [`MemorySink`] for tests and dry runs, and
//! [`JsonlSink`], which appends records to one JSON Lines file per target.

mod filesystem;
mod memory;
mod traits;

pub use filesystem::JsonlSink;
pub use memory::MemorySink;
pub use traits::{RecordSink, SchemaSource, WriteMode};
