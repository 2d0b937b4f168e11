//! Engine Module
//!
//! Orchestrates partition rebuilds and scheme-aware inserts.
//!
//! ## Responsibilities
//! - Build (and rebuild) a scheme's partition set from the base collection
//! - Route single-record inserts to the base collection plus exactly one
//!   partition, atomically
//! - Resolve the active scheme from persisted metadata, never from a
//!   process-wide variable
//!
//! ## Concurrency Model: Single Writer
//!
//! A rebuild clears and repopulates partitions; an insert that interleaves
//! with it could read a stale or half-built scheme. All mutating
//! operations therefore serialize on `write_lock`:
//!
//! - **Rebuilds** (build_partitions): exclusive for their full duration
//! - **Inserts**: one logical critical section per call, so the ordinal a
//!   round-robin insert computes from the base size cannot be interleaved
//!
//! The lock covers this process only; cross-process exclusion against a
//! shared backend remains the deployment's responsibility.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::info;

use crate::config::Config;
use crate::error::{PartError, Result};
use crate::metadata;
use crate::partition::{range, round_robin};
use crate::rating::Rating;
use crate::scheme::SchemeKind;
use crate::storage::{StorageBackend, Store};

/// The partitioning engine over the reference backend
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Snapshot file path (derived from data_dir)
    snapshot_path: PathBuf,

    /// Storage backend (internal Mutex per call)
    store: Store,

    /// Serializes rebuilds and inserts (see module docs)
    write_lock: Mutex<()>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const SNAPSHOT_FILENAME: &'static str = "store.snapshot";

    /// Open or create an engine with the given config
    ///
    /// Loads any existing store snapshot and ensures the base collection
    /// exists.
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let snapshot_path = config.data_dir.join(Self::SNAPSHOT_FILENAME);
        let store = Store::open(&snapshot_path)?;

        if !store.collection_exists(&config.base_collection) {
            store.create_collection(&config.base_collection)?;
        }

        Ok(Self {
            config,
            snapshot_path,
            store,
            write_lock: Mutex::new(()),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Build (or rebuild) the partition set for a scheme
    ///
    /// Runs as one transaction:
    /// 1. Drop every existing partition of this kind
    /// 2. Create and populate `count` fresh partitions from the base
    /// 3. Verify the partitions jointly cover the base collection
    /// 4. Persist the scheme metadata
    ///
    /// On any failure the whole rebuild rolls back: previous partitions
    /// and previous metadata both survive, so a partial scheme is never
    /// promoted to active. Returns the per-partition sizes.
    pub fn build_partitions(&self, kind: SchemeKind, count: usize) -> Result<Vec<usize>> {
        if count == 0 {
            return Err(PartError::InvalidPartitionCount(0));
        }

        let _write_guard = self.write_lock.lock();

        let sizes = self.store.transaction(|| {
            for name in self.store.list_collections_by_prefix(kind.prefix())? {
                self.store.drop_collection(&name)?;
            }

            let base = &self.config.base_collection;
            let sizes = match kind {
                SchemeKind::Range => range::build_partitions(&self.store, base, count)?,
                SchemeKind::RoundRobin => round_robin::build_partitions(&self.store, base, count)?,
            };

            // Coverage check: every base record placed exactly once.
            let placed: usize = sizes.iter().sum();
            let base_count = self.store.count(base)?;
            if placed != base_count {
                return Err(PartError::Atomicity(format!(
                    "partition build placed {} records but base collection holds {}",
                    placed, base_count
                )));
            }

            metadata::set_active(&self.store, kind, count)?;
            Ok(sizes)
        })?;

        info!(kind = %kind, count, records = sizes.iter().sum::<usize>(), "partitions built");
        Ok(sizes)
    }

    /// Insert one record under the active scheme of `kind`
    ///
    /// Appends the record to the base collection and to exactly one
    /// partition, as a single atomic unit: if the partition append (or
    /// scheme resolution) fails, the base append is rolled back. Fails
    /// with `NoActiveScheme` when no scheme of this kind was ever built.
    ///
    /// Returns the index of the partition the record landed in.
    pub fn insert(&self, kind: SchemeKind, rating: Rating) -> Result<usize> {
        let _write_guard = self.write_lock.lock();

        self.store.transaction(|| {
            let base = &self.config.base_collection;
            self.store.append(base, rating)?;

            let count = metadata::resolve_count(&self.store, kind)?;

            let index = match kind {
                SchemeKind::Range => range::index_for_score(rating.score, count)?,
                SchemeKind::RoundRobin => {
                    // Ordinal of the record just appended: base size minus
                    // one, which no other insert can perturb while the
                    // write lock is held.
                    let ordinal = self.store.count(base)? - 1;
                    round_robin::index_for_ordinal(ordinal, count)?
                }
            };

            self.store.append(&kind.partition_name(index), rating)?;
            Ok(index)
        })
    }

    /// Replace the base collection with the contents of a ratings file
    ///
    /// Existing partitions are left untouched and become stale; callers
    /// are expected to rebuild after a bulk load.
    pub fn load_ratings(&self, path: &Path) -> Result<usize> {
        let _write_guard = self.write_lock.lock();
        crate::ingest::load_ratings(&self.store, &self.config.base_collection, path)
    }

    /// Persist the store snapshot and shut down
    pub fn close(self) -> Result<()> {
        self.store.persist()?;
        info!(path = %self.snapshot_path.display(), "store snapshot persisted");
        Ok(())
    }

    // =========================================================================
    // Accessors (stats, testing, CLI)
    // =========================================================================

    /// Number of records in the base collection
    pub fn base_count(&self) -> Result<usize> {
        self.store.count(&self.config.base_collection)
    }

    /// Sizes of the existing partitions of a kind, in index order
    ///
    /// Empty when no scheme of this kind has been built.
    pub fn partition_sizes(&self, kind: SchemeKind) -> Result<Vec<usize>> {
        let count = match metadata::active_count(&self.store, kind)? {
            Some(count) => count,
            None => metadata::infer_count(&self.store, kind)?,
        };

        (0..count)
            .map(|i| self.store.count(&kind.partition_name(i)))
            .collect()
    }

    /// The active partition count for a kind, if one is resolvable
    pub fn active_count(&self, kind: SchemeKind) -> Result<Option<usize>> {
        match metadata::resolve_count(&self.store, kind) {
            Ok(count) => Ok(Some(count)),
            Err(PartError::NoActiveScheme(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The underlying store (ingestion, tests)
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
