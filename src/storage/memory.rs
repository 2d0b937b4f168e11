//! Reference storage backend
//!
//! An in-memory collection store with optional snapshot persistence.
//! Collections are append-only vectors of sequence-numbered rows; the
//! sequence number is the ordering key the round-robin scheme depends on.
//!
//! ## Concurrency
//! - All state sits behind one `parking_lot::Mutex` (locked per call)
//! - `transaction` clones the state up front and restores it on failure;
//!   correct under the crate's single-writer contract
//!
//! ## Snapshot Format
//! `[u32 crc32 (LE)][bincode payload]` in a single file. The checksum is
//! verified on open; a mismatch surfaces as `SnapshotCorruption` rather
//! than silently loading garbage.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{PartError, Result};
use crate::rating::Rating;
use crate::scheme::{SchemeKind, SchemeRecord};

use super::StorageBackend;

/// One stored row: a rating plus its collection-local sequence number
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Row {
    seq: u64,
    rating: Rating,
}

/// One named collection of rows, append-only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Collection {
    next_seq: u64,
    rows: Vec<Row>,
}

impl Collection {
    fn push(&mut self, rating: Rating) {
        self.rows.push(Row {
            seq: self.next_seq,
            rating,
        });
        self.next_seq += 1;
    }
}

/// Entire backend state; cloned for transaction snapshots
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Inner {
    collections: BTreeMap<String, Collection>,
    schemes: BTreeMap<SchemeKind, SchemeRecord>,
}

/// The reference in-memory storage backend
pub struct Store {
    /// Snapshot file path; `None` for purely in-memory stores
    snapshot_path: Option<PathBuf>,

    /// All collections and scheme metadata
    inner: Mutex<Inner>,
}

impl Store {
    /// Create a purely in-memory store (tests, benches)
    pub fn in_memory() -> Self {
        Self {
            snapshot_path: None,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Open a store backed by a snapshot file
    ///
    /// Loads existing state if the file is present, otherwise starts
    /// empty. State is only written back by [`persist`](Store::persist).
    pub fn open(path: &Path) -> Result<Self> {
        let inner = if path.exists() {
            Self::read_snapshot(path)?
        } else {
            Inner::default()
        };

        Ok(Self {
            snapshot_path: Some(path.to_path_buf()),
            inner: Mutex::new(inner),
        })
    }

    /// Write the current state to the snapshot file
    ///
    /// No-op for in-memory stores.
    pub fn persist(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let inner = self.inner.lock();
        let payload = bincode::serialize(&*inner)
            .map_err(|e| PartError::Storage(format!("snapshot encode failed: {}", e)))?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&payload);
        let crc = hasher.finalize();

        let mut bytes = Vec::with_capacity(4 + payload.len());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&payload);

        fs::write(path, bytes)?;
        Ok(())
    }

    /// Drop the persisted scheme record for a kind (testing the inference
    /// fallback, simulating pre-metadata deployments)
    pub fn clear_scheme(&self, kind: SchemeKind) {
        self.inner.lock().schemes.remove(&kind);
    }

    fn read_snapshot(path: &Path) -> Result<Inner> {
        let bytes = fs::read(path)?;
        if bytes.len() < 4 {
            return Err(PartError::SnapshotCorruption(format!(
                "snapshot too short: {} bytes",
                bytes.len()
            )));
        }

        let stored_crc = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let payload = &bytes[4..];

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(payload);
        let actual_crc = hasher.finalize();

        if stored_crc != actual_crc {
            return Err(PartError::SnapshotCorruption(format!(
                "CRC mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, actual_crc
            )));
        }

        bincode::deserialize(payload)
            .map_err(|e| PartError::SnapshotCorruption(format!("snapshot decode failed: {}", e)))
    }
}

impl StorageBackend for Store {
    fn create_collection(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.collections.contains_key(name) {
            return Err(PartError::CollectionExists(name.to_string()));
        }
        inner
            .collections
            .insert(name.to_string(), Collection::default());
        Ok(())
    }

    fn drop_collection(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner
            .collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| PartError::CollectionNotFound(name.to_string()))
    }

    fn collection_exists(&self, name: &str) -> bool {
        self.inner.lock().collections.contains_key(name)
    }

    fn append(&self, name: &str, rating: Rating) -> Result<()> {
        let mut inner = self.inner.lock();
        let collection = inner
            .collections
            .get_mut(name)
            .ok_or_else(|| PartError::CollectionNotFound(name.to_string()))?;
        collection.push(rating);
        Ok(())
    }

    fn bulk_load(&self, name: &str, ratings: Vec<Rating>) -> Result<usize> {
        let mut inner = self.inner.lock();
        let collection = inner
            .collections
            .get_mut(name)
            .ok_or_else(|| PartError::CollectionNotFound(name.to_string()))?;

        let loaded = ratings.len();
        for rating in ratings {
            collection.push(rating);
        }
        Ok(loaded)
    }

    fn filter_insert_select(
        &self,
        dest: &str,
        source: &str,
        predicate: &dyn Fn(&Rating) -> bool,
    ) -> Result<usize> {
        let mut inner = self.inner.lock();

        let selected: Vec<Rating> = inner
            .collections
            .get(source)
            .ok_or_else(|| PartError::CollectionNotFound(source.to_string()))?
            .rows
            .iter()
            .map(|row| row.rating)
            .filter(|rating| predicate(rating))
            .collect();

        let collection = inner
            .collections
            .get_mut(dest)
            .ok_or_else(|| PartError::CollectionNotFound(dest.to_string()))?;

        let copied = selected.len();
        for rating in selected {
            collection.push(rating);
        }
        Ok(copied)
    }

    fn modular_insert_select(
        &self,
        dest: &str,
        source: &str,
        modulus: usize,
        remainder: usize,
    ) -> Result<usize> {
        if modulus == 0 {
            return Err(PartError::InvalidPartitionCount(0));
        }

        let mut inner = self.inner.lock();

        // Ordinal = zero-based position in sequence order; rows is kept in
        // ascending seq order by construction.
        let selected: Vec<Rating> = inner
            .collections
            .get(source)
            .ok_or_else(|| PartError::CollectionNotFound(source.to_string()))?
            .rows
            .iter()
            .enumerate()
            .filter(|(ordinal, _)| ordinal % modulus == remainder)
            .map(|(_, row)| row.rating)
            .collect();

        let collection = inner
            .collections
            .get_mut(dest)
            .ok_or_else(|| PartError::CollectionNotFound(dest.to_string()))?;

        let copied = selected.len();
        for rating in selected {
            collection.push(rating);
        }
        Ok(copied)
    }

    fn count(&self, name: &str) -> Result<usize> {
        let inner = self.inner.lock();
        inner
            .collections
            .get(name)
            .map(|c| c.rows.len())
            .ok_or_else(|| PartError::CollectionNotFound(name.to_string()))
    }

    fn scan(&self, name: &str) -> Result<Vec<Rating>> {
        let inner = self.inner.lock();
        inner
            .collections
            .get(name)
            .map(|c| c.rows.iter().map(|row| row.rating).collect())
            .ok_or_else(|| PartError::CollectionNotFound(name.to_string()))
    }

    fn list_collections_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let inner = self.inner.lock();
        // BTreeMap iteration is already sorted by name
        Ok(inner
            .collections
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn upsert_scheme(&self, record: SchemeRecord) -> Result<()> {
        self.inner.lock().schemes.insert(record.kind, record);
        Ok(())
    }

    fn scheme(&self, kind: SchemeKind) -> Result<Option<SchemeRecord>> {
        Ok(self.inner.lock().schemes.get(&kind).copied())
    }

    fn transaction<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        // Snapshot taken with the lock released before body runs, so the
        // body can call back into this store without deadlocking.
        let snapshot = self.inner.lock().clone();

        match body() {
            Ok(value) => Ok(value),
            Err(e) => {
                *self.inner.lock() = snapshot;
                Err(e)
            }
        }
    }
}
