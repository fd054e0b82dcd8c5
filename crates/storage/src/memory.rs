//! In-memory collection store
//!
//! Each collection is a partition holding a `BTreeMap`, so range scans come
//! back in ascending key order without a sort. Partitions live in a
//! `DashMap` keyed by collection name: operations on different collections
//! never contend, and a key in one collection can never shadow a key in
//! another.
//!
//! # Snapshots
//!
//! [`MemoryStore::save_snapshot`] writes every partition to a JSON file with
//! values base64-encoded; [`MemoryStore::load_snapshot`] reads it back. The
//! CLI uses this to share state between invocations.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dashmap::DashMap;
use entrylog_core::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cursor::{Cursor, CursorRegistry};
use crate::selector::Query;
use crate::traits::{CollectionStore, KeyValue, WriteOp};

/// One collection's data
#[derive(Debug, Default)]
pub struct Partition {
    pub(crate) data: BTreeMap<String, Vec<u8>>,
}

impl Partition {
    /// Create an empty partition
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in this partition
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if partition is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn range(&self, start: &str, end: &str) -> Vec<KeyValue> {
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else if start >= end {
            return Vec::new();
        } else {
            Bound::Excluded(end)
        };
        self.data
            .range::<str, _>((Bound::Included(start), upper))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect()
    }
}

/// Collection store held entirely in memory
///
/// # Example
///
/// ```
/// use entrylog_storage::{CollectionStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.put("collectionEntryLog", "EntryLog1", b"{}".to_vec()).unwrap();
/// assert!(store.get("collectionEntryLog", "EntryLog1").unwrap().is_some());
/// assert!(store.get("collectionEntryLogPrivateDetails", "EntryLog1").unwrap().is_none());
/// ```
pub struct MemoryStore {
    partitions: DashMap<String, Partition>,
    cursors: CursorRegistry,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    collections: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            partitions: DashMap::new(),
            cursors: CursorRegistry::new(),
        }
    }

    /// Number of cursors handed out and not yet dropped
    pub fn open_cursors(&self) -> usize {
        self.cursors.open_count()
    }

    /// Names of collections that hold at least one key, sorted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .partitions
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Number of keys in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.partitions
            .get(collection)
            .map(|p| p.len())
            .unwrap_or(0)
    }

    /// Total keys across all collections
    pub fn total_entries(&self) -> usize {
        self.partitions.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if the store holds no keys at all
    pub fn is_empty(&self) -> bool {
        self.total_entries() == 0
    }

    /// All keys of a collection in ascending order
    pub fn keys(&self, collection: &str) -> Vec<String> {
        self.partitions
            .get(collection)
            .map(|p| p.data.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Write every partition to `path` as JSON
    ///
    /// The file is written next to `path` and renamed into place so a
    /// crash mid-write leaves the previous snapshot intact.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut snapshot = Snapshot::default();
        for entry in self.partitions.iter() {
            let rows = entry
                .value()
                .data
                .iter()
                .map(|(k, v)| (k.clone(), BASE64.encode(v)))
                .collect();
            snapshot.collections.insert(entry.key().clone(), rows);
        }

        let bytes = serde_json::to_vec_pretty(&snapshot).map_err(Error::store)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        info!(
            "Saved snapshot of {} keys to {}",
            self.total_entries(),
            path.display()
        );
        Ok(())
    }

    /// Read a store back from a snapshot file
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            Error::store(format!("corrupt snapshot {}: {}", path.display(), e))
        })?;

        let store = MemoryStore::new();
        for (collection, rows) in snapshot.collections {
            let mut partition = Partition::new();
            for (key, encoded) in rows {
                let value = BASE64.decode(encoded.as_bytes()).map_err(|e| {
                    Error::store(format!("corrupt value for key {:?}: {}", key, e))
                })?;
                partition.data.insert(key, value);
            }
            store.partitions.insert(collection, partition);
        }
        info!(
            "Loaded snapshot of {} keys from {}",
            store.total_entries(),
            path.display()
        );
        Ok(store)
    }

    /// Load `path` if it exists, otherwise start empty
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_snapshot(path)
        } else {
            debug!("No snapshot at {}, starting empty", path.display());
            Ok(Self::new())
        }
    }

    fn check_put(key: &str, value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(Error::store("key must not be empty"));
        }
        if value.is_empty() {
            return Err(Error::store(format!(
                "value for key {:?} must not be empty; use delete",
                key
            )));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collections", &self.partitions.len())
            .field("total_entries", &self.total_entries())
            .field("open_cursors", &self.open_cursors())
            .finish()
    }
}

impl CollectionStore for MemoryStore {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .partitions
            .get(collection)
            .and_then(|p| p.data.get(key).cloned()))
    }

    fn put(&self, collection: &str, key: &str, value: Vec<u8>) -> Result<()> {
        Self::check_put(key, &value)?;
        self.partitions
            .entry(collection.to_string())
            .or_default()
            .data
            .insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<()> {
        if let Some(mut p) = self.partitions.get_mut(collection) {
            p.data.remove(key);
        }
        Ok(())
    }

    fn range(&self, collection: &str, start: &str, end: &str) -> Result<Cursor> {
        let rows = self
            .partitions
            .get(collection)
            .map(|p| p.range(start, end))
            .unwrap_or_default();
        Ok(self.cursors.open(rows.into_iter().map(Ok)))
    }

    fn query(&self, collection: &str, query: &str) -> Result<Cursor> {
        let parsed = Query::parse(query)?;

        let rows: Vec<Result<KeyValue>> = match self.partitions.get(collection) {
            Some(partition) => {
                // index sentinels and other non-JSON values are skipped, not errors
                let docs: Vec<(String, serde_json::Value)> = partition
                    .data
                    .iter()
                    .filter_map(|(k, v)| {
                        serde_json::from_slice(v).ok().map(|doc| (k.clone(), doc))
                    })
                    .collect();

                let hits = parsed.evaluate(docs);
                debug!("Selector query on {} matched {} documents", collection, hits.len());

                hits.into_iter()
                    .map(|(key, doc)| match partition.data.get(&key) {
                        // unprojected hits keep the stored bytes and field order
                        Some(raw) if !parsed.has_projection() => {
                            Ok(KeyValue::new(key, raw.clone()))
                        }
                        _ => serde_json::to_vec(&doc)
                            .map(|value| KeyValue::new(key, value))
                            .map_err(Error::store),
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        Ok(self.cursors.open(rows))
    }

    /// Validate every op first, then apply them all
    fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        for op in &ops {
            if let WriteOp::Put { key, value, .. } = op {
                Self::check_put(key, value)?;
            }
        }
        for op in ops {
            match op {
                WriteOp::Put {
                    collection,
                    key,
                    value,
                } => {
                    self.partitions
                        .entry(collection)
                        .or_default()
                        .data
                        .insert(key, value);
                }
                WriteOp::Delete { collection, key } => {
                    if let Some(mut p) = self.partitions.get_mut(&collection) {
                        p.data.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}
