//! Tests for the engine: rebuild orchestration and insert routing
//!
//! These tests verify:
//! - Insert/scheme consistency after a rebuild
//! - Transactional atomicity of base + partition appends
//! - Metadata fallback behavior inside inserts
//! - Persistence across engine restarts

use partdb::partition::range;
use partdb::{Engine, PartError, Rating, SchemeKind, Score, StorageBackend};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open_path(temp_dir.path()).unwrap();
    (temp_dir, engine)
}

fn seed_base(engine: &Engine, n: usize) {
    for i in 0..n {
        engine
            .store()
            .append(
                "ratings",
                Rating::new(i as u64 + 1, 42, (i % 11) as f64 * 0.5),
            )
            .unwrap();
    }
}

/// Deterministic in-domain score sequence (no RNG dependency needed)
fn pseudo_random_scores(n: usize) -> Vec<f64> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) % 501) as f64 / 100.0
        })
        .collect()
}

// =============================================================================
// Insert Routing Tests
// =============================================================================

#[test]
fn test_range_insert_lands_in_matching_partition() {
    let (_temp, engine) = open_engine();
    seed_base(&engine, 10);
    engine.build_partitions(SchemeKind::Range, 5).unwrap();

    let index = engine
        .insert(SchemeKind::Range, Rating::new(99, 7, 3.2))
        .unwrap();

    assert_eq!(index, range::index_for_score(Score::new(3.2), 5).unwrap());
    assert_eq!(engine.base_count().unwrap(), 11);
}

#[test]
fn test_round_robin_insert_continues_rotation() {
    let (_temp, engine) = open_engine();
    seed_base(&engine, 7);
    engine.build_partitions(SchemeKind::RoundRobin, 3).unwrap();

    // The next record occupies ordinal 7 → partition 1
    let index = engine
        .insert(SchemeKind::RoundRobin, Rating::new(99, 7, 1.0))
        .unwrap();
    assert_eq!(index, 1);

    // And the one after that ordinal 8 → partition 2
    let index = engine
        .insert(SchemeKind::RoundRobin, Rating::new(100, 7, 1.0))
        .unwrap();
    assert_eq!(index, 2);
}

#[test]
fn test_hundred_inserts_keep_partitions_consistent() {
    let (_temp, engine) = open_engine();
    seed_base(&engine, 40);
    engine.build_partitions(SchemeKind::Range, 6).unwrap();

    let before = engine.partition_sizes(SchemeKind::Range).unwrap();

    for (i, score) in pseudo_random_scores(100).into_iter().enumerate() {
        let base_before = engine.base_count().unwrap();
        let sizes_before = engine.partition_sizes(SchemeKind::Range).unwrap();

        engine
            .insert(SchemeKind::Range, Rating::new(1000 + i as u64, 1, score))
            .unwrap();

        // Exactly one partition grew by one, and the base grew by one
        assert_eq!(engine.base_count().unwrap(), base_before + 1);
        let sizes_after = engine.partition_sizes(SchemeKind::Range).unwrap();
        let grown: Vec<usize> = (0..6)
            .filter(|&p| sizes_after[p] != sizes_before[p])
            .collect();
        assert_eq!(grown.len(), 1);
        assert_eq!(sizes_after[grown[0]], sizes_before[grown[0]] + 1);
    }

    // Partitions still jointly cover the base collection
    let after = engine.partition_sizes(SchemeKind::Range).unwrap();
    assert_eq!(after.iter().sum::<usize>(), engine.base_count().unwrap());
    assert_eq!(
        after.iter().sum::<usize>(),
        before.iter().sum::<usize>() + 100
    );
}

#[test]
fn test_insert_uses_inference_when_metadata_missing() {
    let (_temp, engine) = open_engine();
    seed_base(&engine, 10);
    engine.build_partitions(SchemeKind::Range, 4).unwrap();

    // Simulate a deployment that predates the metadata record
    engine.store().clear_scheme(SchemeKind::Range);

    let index = engine
        .insert(SchemeKind::Range, Rating::new(99, 7, 5.0))
        .unwrap();
    assert_eq!(index, 3); // inferred count of 4 → last partition
}

// =============================================================================
// Atomicity Tests
// =============================================================================

#[test]
fn test_insert_without_scheme_rolls_back_base_append() {
    let (_temp, engine) = open_engine();
    seed_base(&engine, 5);

    let result = engine.insert(SchemeKind::Range, Rating::new(9, 9, 2.0));
    assert!(matches!(
        result,
        Err(PartError::NoActiveScheme(SchemeKind::Range))
    ));

    // Step 1's base append must have been undone
    assert_eq!(engine.base_count().unwrap(), 5);
}

#[test]
fn test_failing_partition_append_rolls_back_base_append() {
    let (_temp, engine) = open_engine();
    seed_base(&engine, 10);
    engine.build_partitions(SchemeKind::Range, 5).unwrap();

    // Sabotage the partition the insert will target
    engine.store().drop_collection("range_part4").unwrap();

    let result = engine.insert(SchemeKind::Range, Rating::new(9, 9, 5.0));
    assert!(matches!(result, Err(PartError::CollectionNotFound(_))));

    assert_eq!(engine.base_count().unwrap(), 10);
}

#[test]
fn test_failed_rebuild_keeps_previous_scheme() {
    let (_temp, engine) = open_engine();
    seed_base(&engine, 12);
    engine.build_partitions(SchemeKind::Range, 3).unwrap();

    // With the base collection gone, the rebuild fails while populating
    engine.store().drop_collection("ratings").unwrap();
    let result = engine.build_partitions(SchemeKind::Range, 6);
    assert!(matches!(result, Err(PartError::CollectionNotFound(_))));

    // Previous partitions and metadata both survived the rollback
    assert_eq!(engine.active_count(SchemeKind::Range).unwrap(), Some(3));
    let sizes = engine.partition_sizes(SchemeKind::Range).unwrap();
    assert_eq!(sizes.iter().sum::<usize>(), 12);
}

// =============================================================================
// Scheme Coexistence Tests
// =============================================================================

#[test]
fn test_both_kinds_coexist() {
    let (_temp, engine) = open_engine();
    seed_base(&engine, 20);

    engine.build_partitions(SchemeKind::Range, 4).unwrap();
    engine.build_partitions(SchemeKind::RoundRobin, 3).unwrap();

    let range_sizes = engine.partition_sizes(SchemeKind::Range).unwrap();
    let rr_sizes = engine.partition_sizes(SchemeKind::RoundRobin).unwrap();

    assert_eq!(range_sizes.iter().sum::<usize>(), 20);
    assert_eq!(rr_sizes.iter().sum::<usize>(), 20);

    // Inserting under one kind leaves the other kind's partitions alone
    engine
        .insert(SchemeKind::RoundRobin, Rating::new(99, 1, 4.0))
        .unwrap();
    assert_eq!(
        engine
            .partition_sizes(SchemeKind::Range)
            .unwrap()
            .iter()
            .sum::<usize>(),
        20
    );
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_scheme_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Engine::open_path(temp_dir.path()).unwrap();
        seed_base(&engine, 9);
        engine.build_partitions(SchemeKind::RoundRobin, 3).unwrap();
        engine.close().unwrap();
    }

    {
        let engine = Engine::open_path(temp_dir.path()).unwrap();

        assert_eq!(engine.base_count().unwrap(), 9);
        assert_eq!(engine.active_count(SchemeKind::RoundRobin).unwrap(), Some(3));

        // Rotation picks up where the previous process left off:
        // ordinal 9 → partition 0
        let index = engine
            .insert(SchemeKind::RoundRobin, Rating::new(50, 1, 2.0))
            .unwrap();
        assert_eq!(index, 0);
    }
}
