//! Storage Module
//!
//! The storage backend the partitioning core runs against.
//!
//! ## Responsibilities
//! - Define the [`StorageBackend`] interface the core needs (collection
//!   lifecycle, bulk selects, counts, scheme metadata, transactions)
//! - Provide [`Store`], the reference in-memory backend with optional
//!   snapshot persistence
//!
//! ## Ordering Contract
//! Every row appended to a collection receives a monotonically increasing
//! per-collection sequence number. "Ordinal position" anywhere in this
//! crate means the zero-based position of a row when the collection is
//! enumerated in ascending sequence order. Backends must keep that order
//! stable across re-enumeration, rebuilds, and reloads — round-robin
//! partitioning is only reproducible under this contract.

mod memory;

pub use memory::Store;

use crate::error::Result;
use crate::rating::Rating;
use crate::scheme::{SchemeKind, SchemeRecord};

/// Interface the partitioning core requires from a storage backend
///
/// All methods take `&self`; backends handle their own interior locking.
/// Callers are expected to serialize rebuilds against inserts (see
/// [`Engine`](crate::engine::Engine)) — the backend only guarantees that
/// each individual call is consistent and that [`transaction`] bodies
/// roll back completely on failure.
///
/// [`transaction`]: StorageBackend::transaction
pub trait StorageBackend {
    /// Create an empty collection
    ///
    /// Fails with `CollectionExists` if the name is taken.
    fn create_collection(&self, name: &str) -> Result<()>;

    /// Drop a collection and all its rows
    fn drop_collection(&self, name: &str) -> Result<()>;

    /// Whether a collection exists
    fn collection_exists(&self, name: &str) -> bool;

    /// Append a single row to a collection
    fn append(&self, name: &str, rating: Rating) -> Result<()>;

    /// Append a batch of rows, returning how many were loaded
    fn bulk_load(&self, name: &str, ratings: Vec<Rating>) -> Result<usize>;

    /// Copy every source row satisfying `predicate` into `dest`
    ///
    /// Rows are visited in sequence order, so `dest` inherits a stable
    /// ordering. Returns the number of rows copied.
    fn filter_insert_select(
        &self,
        dest: &str,
        source: &str,
        predicate: &dyn Fn(&Rating) -> bool,
    ) -> Result<usize>;

    /// Copy every source row whose ordinal position `p` satisfies
    /// `p % modulus == remainder` into `dest`
    ///
    /// Ordinals follow the sequence-order contract above. Returns the
    /// number of rows copied.
    fn modular_insert_select(
        &self,
        dest: &str,
        source: &str,
        modulus: usize,
        remainder: usize,
    ) -> Result<usize>;

    /// Number of rows in a collection
    fn count(&self, name: &str) -> Result<usize>;

    /// All rows of a collection, in sequence order
    fn scan(&self, name: &str) -> Result<Vec<Rating>>;

    /// Names of all collections starting with `prefix`, sorted
    fn list_collections_by_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Upsert the persisted scheme record for its kind
    ///
    /// The typed rendering of the one-row-per-kind metadata table: at most
    /// one record per kind, replaced wholesale on rebuild.
    fn upsert_scheme(&self, record: SchemeRecord) -> Result<()>;

    /// Read the persisted scheme record for a kind, if any
    fn scheme(&self, kind: SchemeKind) -> Result<Option<SchemeRecord>>;

    /// Run `body` with rollback on failure
    ///
    /// If `body` returns an error, every mutation it made through this
    /// backend is undone before the error is returned. Nesting is allowed;
    /// an outer rollback subsumes inner commits.
    fn transaction<T, F>(&self, body: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>;
}
