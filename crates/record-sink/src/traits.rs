//! Collaborator trait definitions.
//!
//! The synchronization pipeline only sees these traits. Both are `Send + Sync`
//! so a single implementation can be shared across concurrent calls behind an
//! `Arc`.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sync_core::{ObjectSchema, Record, SchemaCatalog};

/// How records are written to the target collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace a record with the same identity, or insert it
    #[default]
    Upsert,

    /// Insert only; a record with the same identity is a write error
    Insert,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upsert => write!(f, "upsert"),
            Self::Insert => write!(f, "insert"),
        }
    }
}

/// Trait for writing records to storage.
///
/// # Usage Pattern
///
/// ```ignore
/// async fn persist(sink: &dyn RecordSink, records: &[Record]) -> anyhow::Result<()> {
///     sink.check_connection().await?;
///     sink.write_records("host", records, WriteMode::Upsert).await
/// }
/// ```
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Verify the storage target is reachable.
    ///
    /// A failure here means nothing can be persisted at all.
    async fn check_connection(&self) -> Result<()>;

    /// Write a batch of records to the `target` collection.
    ///
    /// An error means the batch as a whole was not written.
    async fn write_records(&self, target: &str, records: &[Record], mode: WriteMode)
        -> Result<()>;
}

/// Trait for loading the attribute schema of a record type.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Load the schema of the `target` record type.
    async fn load_schema(&self, target: &str) -> Result<ObjectSchema>;
}

#[async_trait]
impl SchemaSource for SchemaCatalog {
    async fn load_schema(&self, target: &str) -> Result<ObjectSchema> {
        Ok(self.require_object(target)?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sync_core::{AttributeSchema, FieldType};

    #[test]
    fn test_write_mode_serde() {
        let mode: WriteMode = serde_json::from_str("\"insert\"").unwrap();
        assert_eq!(mode, WriteMode::Insert);
        assert_eq!(WriteMode::default(), WriteMode::Upsert);
        assert_eq!(WriteMode::Upsert.to_string(), "upsert");
    }

    #[tokio::test]
    async fn test_catalog_schema_source() {
        let catalog = SchemaCatalog::new(vec![ObjectSchema::new(
            "host",
            "bk_host_id",
            vec![AttributeSchema::new("bk_host_name", FieldType::SingleChar)],
        )])
        .unwrap();

        let schema = catalog.load_schema("host").await.unwrap();
        assert_eq!(schema.id_field, "bk_host_id");

        let err = catalog.load_schema("switch").await.unwrap_err();
        assert!(err.to_string().contains("switch"));
    }
}
