//! In-memory record sink.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use sync_core::Record;
use tokio::sync::Mutex;

use crate::traits::{RecordSink, WriteMode};

/// In-memory implementation of [`RecordSink`].
///
/// Records are grouped by target collection. Identity is the value under
/// `id_field`; records without one are always appended.
pub struct MemorySink {
    id_field: String,
    collections: Mutex<HashMap<String, Vec<Record>>>,
    offline: AtomicBool,
}

impl MemorySink {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            collections: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate an unreachable store. Every call fails while offline.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Snapshot of the records stored under `target`.
    pub async fn records(&self, target: &str) -> Vec<Record> {
        self.collections
            .lock()
            .await
            .get(target)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of records across all targets.
    pub async fn len(&self) -> usize {
        self.collections.lock().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn identity<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        record.get(&self.id_field).filter(|v| !v.is_null())
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            bail!("Memory sink is offline");
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn check_connection(&self) -> Result<()> {
        self.ensure_online()
    }

    async fn write_records(&self, target: &str, records: &[Record], mode: WriteMode) -> Result<()> {
        self.ensure_online()?;

        let mut collections = self.collections.lock().await;
        let collection = collections.entry(target.to_string()).or_default();

        // Validate the whole batch first so a rejected insert writes nothing.
        if mode == WriteMode::Insert {
            let mut seen: HashSet<String> = HashSet::new();
            for id in records.iter().filter_map(|r| self.identity(r)) {
                let stored = collection.iter().any(|r| self.identity(r) == Some(id));
                if stored || !seen.insert(id.to_string()) {
                    bail!("Duplicate {} {} in '{}'", self.id_field, id, target);
                }
            }
        }

        for record in records {
            let existing = self.identity(record).and_then(|id| {
                collection
                    .iter()
                    .position(|stored| self.identity(stored) == Some(id))
            });
            match existing {
                Some(idx) => collection[idx] = record.clone(),
                None => collection.push(record.clone()),
            }
        }

        tracing::debug!(collection = target, count = records.len(), %mode, "Wrote records to memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_identity() {
        let sink = MemorySink::new("id");
        sink.write_records("host", &[record(json!({"id": 1, "name": "a"}))], WriteMode::Upsert)
            .await
            .unwrap();
        sink.write_records("host", &[record(json!({"id": 1, "name": "b"}))], WriteMode::Upsert)
            .await
            .unwrap();

        let stored = sink.records("host").await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["name"], json!("b"));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate() {
        let sink = MemorySink::new("id");
        sink.write_records("host", &[record(json!({"id": 1}))], WriteMode::Insert)
            .await
            .unwrap();

        let err = sink
            .write_records("host", &[record(json!({"id": 1}))], WriteMode::Insert)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
        assert_eq!(sink.len().await, 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_within_batch() {
        let sink = MemorySink::new("id");
        let batch = [record(json!({"id": 1})), record(json!({"id": 2})), record(json!({"id": 1}))];

        let err = sink
            .write_records("host", &batch, WriteMode::Insert)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate id 1"));
        assert!(sink.is_empty().await);
    }

    #[tokio::test]
    async fn test_upsert_within_batch_keeps_last() {
        let sink = MemorySink::new("id");
        let batch = [
            record(json!({"id": 1, "name": "a"})),
            record(json!({"id": 1, "name": "b"})),
        ];
        sink.write_records("host", &batch, WriteMode::Upsert).await.unwrap();

        let stored = sink.records("host").await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["name"], json!("b"));
    }

    #[tokio::test]
    async fn test_records_without_identity_append() {
        let sink = MemorySink::new("id");
        let batch = [record(json!({"name": "a"})), record(json!({"name": "b"}))];
        sink.write_records("host", &batch, WriteMode::Upsert).await.unwrap();
        assert_eq!(sink.records("host").await.len(), 2);
        assert!(sink.records("module").await.is_empty());
    }

    #[tokio::test]
    async fn test_offline_sink_fails() {
        let sink = MemorySink::new("id");
        sink.set_offline(true);

        assert!(sink.check_connection().await.is_err());
        assert!(sink
            .write_records("host", &[record(json!({"id": 1}))], WriteMode::Upsert)
            .await
            .is_err());
        assert!(sink.is_empty().await);

        sink.set_offline(false);
        assert!(sink.check_connection().await.is_ok());
    }
}
