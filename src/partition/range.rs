//! Value-range partitioning
//!
//! Splits the score domain `[0, 5]` into `count` equal-width intervals.
//! Partition `i` owns `(i*δ, (i+1)*δ]` with `δ = 5.0 / count`, except
//! partition 0 which owns the closed interval `[0, δ]`. A score sitting
//! exactly on an interior boundary belongs to the partition below it.
//!
//! ## Floating-Point Boundaries
//! Dividing by `δ` is fragile: `δ` itself is usually not representable in
//! binary floating point, so `score / δ` and `score == index * δ` can
//! both misclassify boundary values. All comparisons here are instead done
//! in scaled form — `score * count` against integer multiples of the
//! domain width `5.0` — which is exact whenever `score * count` is, and in
//! particular for every half-step score at any practical partition count.

use tracing::debug;

use crate::error::{PartError, Result};
use crate::rating::{Score, SCORE_MAX, SCORE_MIN};
use crate::scheme::SchemeKind;
use crate::storage::StorageBackend;

/// Compute the partition index for a score under `count` range partitions
///
/// Total and deterministic: for every `count >= 1` and every score the
/// result is in `[0, count-1]`. Scores are already clamped into the domain
/// by [`Score`], so no out-of-domain handling is needed here.
pub fn index_for_score(score: Score, count: usize) -> Result<usize> {
    if count == 0 {
        return Err(PartError::InvalidPartitionCount(0));
    }

    let value = score.value();

    // Domain endpoints short-circuit: 5.0 is the closed upper bound of the
    // last partition and must never floor to `count`.
    if value >= SCORE_MAX {
        return Ok(count - 1);
    }
    if value <= SCORE_MIN {
        return Ok(0);
    }

    // score / delta == (score * count) / SCORE_MAX, without ever computing
    // the inexact delta.
    let scaled = value * count as f64;
    let mut index = (scaled / SCORE_MAX).floor() as usize;

    // An exact boundary multiple belongs to the partition below (intervals
    // are open on their lower edge).
    if index > 0 && scaled == index as f64 * SCORE_MAX {
        index -= 1;
    }

    // Absorb any floating-point overshoot.
    Ok(index.min(count - 1))
}

/// Score interval owned by partition `index`, for logging and stats
///
/// Returns `(lower, upper)`; the interval is closed at `lower` only for
/// partition 0, and closed at `upper` everywhere.
pub fn bounds(index: usize, count: usize) -> (f64, f64) {
    let delta = SCORE_MAX / count as f64;
    (index as f64 * delta, (index + 1) as f64 * delta)
}

/// Build the full range partition set from `base`
///
/// Creates `count` empty partition collections and populates each one via
/// a filtered bulk select whose predicate is [`index_for_score`] itself.
/// Returns the per-partition row counts. Any pre-existing partitions of
/// this kind must already have been dropped by the caller.
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
        let name = SchemeKind::Range.partition_name(i);
        store.create_collection(&name)?;

        let placed = store.filter_insert_select(&name, base, &|rating| {
            matches!(index_for_score(rating.score, count), Ok(idx) if idx == i)
        })?;

        let (lower, upper) = bounds(i, count);
        debug!(
            partition = %name,
            lower, upper, placed,
            "populated range partition"
        );

        sizes.push(placed);
    }

    Ok(sizes)
}
