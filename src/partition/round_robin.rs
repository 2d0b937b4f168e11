//! Round-robin partitioning
//!
//! Deals records out across `count` partitions by ordinal position:
//! the record at zero-based position `p` in the base collection goes to
//! partition `p % count`. Ordinals follow the backend's sequence-order
//! contract (see [`crate::storage`]), so a rebuild over the same base
//! collection always reproduces the same assignment.

use tracing::debug;

use crate::error::{PartError, Result};
use crate::scheme::SchemeKind;
use crate::storage::StorageBackend;

/// Compute the partition index for the record at `ordinal`
pub fn index_for_ordinal(ordinal: usize, count: usize) -> Result<usize> {
    if count == 0 {
        return Err(PartError::InvalidPartitionCount(0));
    }
    Ok(ordinal % count)
}

/// Build the full round-robin partition set from `base`
///
/// Creates `count` empty partition collections and populates partition `i`
/// with every base record whose ordinal satisfies `ordinal % count == i`.
/// Returns the per-partition row counts; sizes differ by at most 1. Any
/// pre-existing partitions of this kind must already have been dropped by
/// the caller.
pub fn build_partitions<B: StorageBackend>(
    store: &B,
    base: &str,
    count: usize,
) -> Result<Vec<usize>> {
    if count == 0 {
        return Err(PartError::InvalidPartitionCount(0));
    }

    let mut sizes = Vec::with_capacity(count);

    for i in 0..count {
        let name = SchemeKind::RoundRobin.partition_name(i);
        store.create_collection(&name)?;

        let placed = store.modular_insert_select(&name, base, count, i)?;

        debug!(partition = %name, placed, "populated round-robin partition");
        sizes.push(placed);
    }

    Ok(sizes)
}
