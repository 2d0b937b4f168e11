//! Partition metadata store
//!
//! Persists which scheme (kind + partition count) is currently active so
//! that inserts route consistently with the last rebuild, independent of
//! process memory. One record per scheme kind; rebuilding a kind replaces
//! its record.
//!
//! When no record exists (e.g. partitions built by an older deployment
//! that predates the metadata table), the partition count can still be
//! inferred by counting collections that match the kind's naming prefix.
//! That inference is best-effort only: it recovers a count, never the
//! scheme type, and breaks down if foreign collections share the prefix.
//! It is used strictly as a fallback.

use tracing::warn;

use crate::error::{PartError, Result};
use crate::scheme::{SchemeKind, SchemeRecord};
use crate::storage::StorageBackend;

/// Persist `count` as the active partition count for `kind`
///
/// Replaces any prior record for the kind.
pub fn set_active<B: StorageBackend>(store: &B, kind: SchemeKind, count: usize) -> Result<()> {
    if count == 0 {
        return Err(PartError::InvalidPartitionCount(0));
    }
    store.upsert_scheme(SchemeRecord::new(kind, count))
}

/// The persisted partition count for `kind`, if a record exists
pub fn active_count<B: StorageBackend>(store: &B, kind: SchemeKind) -> Result<Option<usize>> {
    Ok(store.scheme(kind)?.map(|record| record.count))
}

/// Best-effort fallback: count collections matching the kind's prefix
pub fn infer_count<B: StorageBackend>(store: &B, kind: SchemeKind) -> Result<usize> {
    Ok(store.list_collections_by_prefix(kind.prefix())?.len())
}

/// Resolve the partition count for `kind`: metadata first, inference second
///
/// Fails with `NoActiveScheme` when no record exists and inference finds
/// nothing — no scheme of this kind was ever built.
pub fn resolve_count<B: StorageBackend>(store: &B, kind: SchemeKind) -> Result<usize> {
    if let Some(count) = active_count(store, kind)? {
        return Ok(count);
    }

    let inferred = infer_count(store, kind)?;
    if inferred == 0 {
        return Err(PartError::NoActiveScheme(kind));
    }

    warn!(
        kind = %kind,
        count = inferred,
        "no scheme metadata found; inferred partition count from collection names"
    );
    Ok(inferred)
}
