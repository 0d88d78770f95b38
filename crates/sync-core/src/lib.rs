//! Core types for the record-sync framework.
//!
//! This crate provides the schema-side building blocks used by the
//! synchronization pipeline:
//!
//! - [`FieldType`] - Declared attribute types
//! - [`AttributeSchema`], [`ObjectSchema`], [`SchemaCatalog`] - Attribute schemas loaded from YAML
//! - [`RawOption`] and [`OptionCodec`] - Decoding of enum and integer option payloads
//! - [`DefaultValueFiller`] - Default injection for attributes absent from a record
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── record-sink   (storage and schema collaborator traits)
//!    │
//!    └─── record-sync   (synchronize adapter, manager, CLI)
//! ```
//!
//! # Example
//!
//! ```rust
//! use sync_core::{AttributeSchema, DefaultValueFiller, EnumOption, EnumVal, FieldType, Record};
//!
//! let attributes = vec![
//!     AttributeSchema::new("bk_host_name", FieldType::SingleChar),
//!     AttributeSchema::new("bk_state", FieldType::Enum).with_option(EnumOption(vec![
//!         EnumVal::new("running", "Running").default_choice(),
//!     ])),
//! ];
//!
//! let mut record = Record::new();
//! DefaultValueFiller::default()
//!     .fill_missing_fields(&mut record, &attributes, &[])
//!     .unwrap();
//!
//! assert_eq!(record["bk_host_name"], "");
//! assert_eq!(record["bk_state"], "running");
//! ```

pub mod defaults;
pub mod document;
pub mod option;
pub mod schema;
pub mod types;
pub mod values;

// Re-exports for convenience
pub use defaults::{
    is_structural_field, DefaultPolicy, DefaultTable, DefaultValueFiller, DefaultsError,
    FillReport, CHILD_FIELD, PARENT_FIELD,
};
pub use document::record_from_document;
pub use option::{
    parse_enum_option, parse_int_option, EnumDecodePolicy, OptionCodec, OptionError, RawElement,
    RawOption,
};
pub use schema::{AttributeSchema, ObjectSchema, SchemaCatalog, SchemaError};
pub use types::FieldType;
pub use values::{EnumOption, EnumVal, IntOption, Record};
