//! Memory store
//!
//! Concurrent in-memory index of [`MemoryRecord`]s with optional persistence
//! to a JSON snapshot (`memories.json`) in a data directory. Mutations only
//! mark the store dirty; [`MemoryStore::save`] writes the snapshot.

use dashmap::DashMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::embedding::cosine_similarity;
use crate::error::{MemoryError, Result};
use crate::record::MemoryRecord;

const SNAPSHOT_FILE: &str = "memories.json";

/// Memory store with an optional on-disk snapshot
pub struct MemoryStore {
    records: DashMap<String, MemoryRecord>,
    snapshot_path: Option<PathBuf>,
    /// Set by every mutation, cleared by a successful save
    dirty: AtomicBool,
    /// Serializes snapshot writes
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            records: DashMap::new(),
            snapshot_path: None,
            dirty: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        }
    }

    /// Open (or create) a store in the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let store = Self {
            records: DashMap::new(),
            snapshot_path: Some(dir.join(SNAPSHOT_FILE)),
            dirty: AtomicBool::new(false),
            write_lock: Mutex::new(()),
        };
        store.load_snapshot()?;

        log::info!("MemoryStore opened at: {}", dir.display());
        Ok(store)
    }

    /// Load existing records from the snapshot, skipping unreadable entries
    fn load_snapshot(&self) -> Result<()> {
        let path = match &self.snapshot_path {
            Some(path) if path.exists() => path,
            _ => return Ok(()),
        };

        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)?;

        let mut skipped = 0;
        for entry in entries {
            match serde_json::from_value::<MemoryRecord>(entry) {
                Ok(record) => {
                    self.records.insert(record.id.to_string(), record);
                }
                Err(e) => {
                    log::warn!("Failed to deserialize memory: {}. Skipping.", e);
                    skipped += 1;
                }
            }
        }

        log::info!("Loaded {} memories from disk", self.records.len());
        if skipped > 0 {
            log::warn!("Skipped {} memories due to deserialization errors", skipped);
        }
        Ok(())
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Whether there are changes not yet written by [`MemoryStore::save`]
    pub fn has_unsaved_changes(&self) -> bool {
        self.snapshot_path.is_some() && self.dirty.load(Ordering::Acquire)
    }

    fn snapshot_bytes(&self) -> Result<Vec<u8>> {
        let mut records: Vec<MemoryRecord> =
            self.records.iter().map(|e| e.value().clone()).collect();
        records.sort_by(|a, b| {
            a.temporal
                .created_at
                .cmp(&b.temporal.created_at)
                .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
        });
        Ok(serde_json::to_vec_pretty(&records)?)
    }

    /// Write the snapshot if anything changed since the last save.
    ///
    /// Returns `false` when nothing was written (no changes, or an
    /// in-memory store).
    pub async fn save(&self) -> Result<bool> {
        let path = match &self.snapshot_path {
            Some(path) => path,
            None => return Ok(false),
        };

        let _guard = self.write_lock.lock().await;
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(false);
        }

        let written = async {
            let bytes = self.snapshot_bytes()?;
            let tmp = path.with_extension("json.tmp");
            tokio::fs::write(&tmp, bytes).await?;
            tokio::fs::rename(&tmp, path).await?;
            Ok::<_, MemoryError>(())
        }
        .await;

        if let Err(e) = written {
            self.mark_dirty();
            return Err(e);
        }
        log::debug!("Saved {} memories to {}", self.records.len(), path.display());
        Ok(true)
    }

    /// Store a record and return its id
    pub async fn put(&self, record: MemoryRecord) -> Result<String> {
        let id = record.id.to_string();
        self.records.insert(id.clone(), record);
        self.mark_dirty();
        Ok(id)
    }

    /// Get a record by ID
    pub fn get(&self, id: &str) -> Option<MemoryRecord> {
        self.records.get(id).map(|e| e.clone())
    }

    /// Records mined from a commit (prefix match on the hash)
    pub fn find_by_commit(&self, commit: &str) -> Vec<MemoryRecord> {
        self.records
            .iter()
            .filter(|e| {
                e.value()
                    .commit_ids()
                    .iter()
                    .any(|c| c.starts_with(commit) || commit.starts_with(c.as_str()))
            })
            .map(|e| e.value().clone())
            .collect()
    }

    /// Records whose source paths include `path`
    pub fn find_by_path(&self, path: &str) -> Vec<MemoryRecord> {
        self.records
            .iter()
            .filter(|e| e.value().source_paths().iter().any(|p| p == path))
            .map(|e| e.value().clone())
            .collect()
    }

    /// Mark a record as no longer valid
    pub fn invalidate(&self, id: &str) -> Result<()> {
        {
            let mut entry = self
                .records
                .get_mut(id)
                .ok_or_else(|| MemoryError::not_found(id))?;
            entry.temporal.invalidate();
        }
        self.mark_dirty();
        Ok(())
    }

    /// Delete a record permanently
    pub fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.records.remove(id).is_some();
        if removed {
            self.mark_dirty();
        }
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All current (non-invalidated) records
    pub fn get_all_current(&self) -> Vec<MemoryRecord> {
        self.records
            .iter()
            .filter(|e| e.value().is_current())
            .map(|e| e.value().clone())
            .collect()
    }

    /// Rank current records with embeddings by cosine similarity
    pub fn semantic_search(&self, query_vector: &[f32], limit: usize) -> Vec<(String, f32)> {
        let mut results: Vec<(String, f32)> = self
            .records
            .iter()
            .filter(|e| e.value().is_current())
            .filter_map(|e| {
                e.value()
                    .embedding
                    .as_ref()
                    .map(|v| (e.key().clone(), cosine_similarity(query_vector, v)))
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);
        results
    }

    /// Get store statistics
    pub fn stats(&self) -> serde_json::Value {
        let mut by_kind: HashMap<&'static str, usize> = HashMap::new();
        let mut by_source: HashMap<&'static str, usize> = HashMap::new();
        let mut current = 0;

        for entry in self.records.iter() {
            let record = entry.value();
            *by_kind.entry(record.kind.as_str()).or_insert(0) += 1;
            *by_source.entry(record.extracted_from.as_str()).or_insert(0) += 1;
            if record.is_current() {
                current += 1;
            }
        }

        let total = self.records.len();
        serde_json::json!({
            "totalMemories": total,
            "currentMemories": current,
            "invalidatedMemories": total - current,
            "byKind": by_kind,
            "bySource": by_source,
        })
    }
}
