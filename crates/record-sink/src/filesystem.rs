//! Filesystem-based record sink.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use sync_core::Record;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::traits::{RecordSink, WriteMode};

/// Filesystem implementation of [`RecordSink`].
///
/// Each target collection is an append-only JSON Lines file
/// `<dir>/<target>.jsonl`. Upserts append; when reading back, the last line
/// for an identity wins. Writes are serialized so an insert's duplicate
/// check and its append see the same file.
pub struct JsonlSink {
    dir: PathBuf,
    id_field: String,
    /// Stored identities per target, loaded on the first insert into it.
    /// Held across each write; assumes this sink is the files' only writer.
    identities: Mutex<HashMap<String, HashSet<String>>>,
}

impl JsonlSink {
    /// Create a new JsonlSink writing under `dir`.
    pub fn new(dir: impl Into<PathBuf>, id_field: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            id_field: id_field.into(),
            identities: Mutex::new(HashMap::new()),
        }
    }

    /// Get the directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, target: &str) -> Result<PathBuf> {
        if target.is_empty()
            || target.contains(['/', '\\'])
            || target == "."
            || target == ".."
        {
            bail!("Invalid target collection name: '{target}'");
        }
        Ok(self.dir.join(format!("{target}.jsonl")))
    }

    fn identity_key(&self, record: &Record) -> Option<String> {
        record
            .get(&self.id_field)
            .filter(|v| !v.is_null())
            .map(Value::to_string)
    }

    /// Read back the current state of `target`.
    ///
    /// Later lines replace earlier ones with the same identity; records
    /// without an identity are all kept.
    pub async fn read_records(&self, target: &str) -> Result<Vec<Record>> {
        let path = self.collection_path(target)?;
        let exists = tokio::fs::try_exists(&path)
            .await
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        if !exists {
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut records: Vec<Record> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for (line_number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: Record = serde_json::from_str(line).with_context(|| {
                format!("Error parsing {} at line {}", path.display(), line_number + 1)
            })?;

            match self.identity_key(&record) {
                Some(key) => match index.get(&key) {
                    Some(&idx) => records[idx] = record,
                    None => {
                        index.insert(key, records.len());
                        records.push(record);
                    }
                },
                None => records.push(record),
            }
        }
        Ok(records)
    }

    /// Reject an insert batch that repeats an identity, either within the
    /// batch or against `stored`.
    fn check_insert(&self, target: &str, stored: &HashSet<String>, records: &[Record]) -> Result<()> {
        let mut batch = HashSet::new();
        for key in records.iter().filter_map(|r| self.identity_key(r)) {
            if stored.contains(&key) || !batch.insert(key.clone()) {
                bail!("Duplicate {} {} in '{}'", self.id_field, key, target);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSink for JsonlSink {
    async fn check_connection(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Cannot create sink directory {}", self.dir.display()))
    }

    async fn write_records(&self, target: &str, records: &[Record], mode: WriteMode) -> Result<()> {
        let path = self.collection_path(target)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut identities = self.identities.lock().await;
        if mode == WriteMode::Insert && !identities.contains_key(target) {
            let stored = self
                .read_records(target)
                .await?
                .iter()
                .filter_map(|r| self.identity_key(r))
                .collect();
            identities.insert(target.to_string(), stored);
        }
        if mode == WriteMode::Insert {
            if let Some(stored) = identities.get(target) {
                self.check_insert(target, stored, records)?;
            }
        }

        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;

        if let Some(stored) = identities.get_mut(target) {
            stored.extend(records.iter().filter_map(|r| self.identity_key(r)));
        }

        tracing::debug!(
            collection = target,
            count = records.len(),
            %mode,
            "Appended records to {}",
            path.display()
        );
        Ok(())
    }
}
