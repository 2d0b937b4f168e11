//! Tests for the partition metadata store
//!
//! These tests verify:
//! - Upsert and read of active scheme records
//! - One record per kind, replaced on rebuild
//! - The collection-counting inference fallback
//! - Resolution order: record first, inference second, error last

use partdb::{metadata, PartError, SchemeKind, StorageBackend, Store};

// =============================================================================
// Set/Get Tests
// =============================================================================

#[test]
fn test_set_then_get() {
    let store = Store::in_memory();

    metadata::set_active(&store, SchemeKind::Range, 5).unwrap();

    assert_eq!(
        metadata::active_count(&store, SchemeKind::Range).unwrap(),
        Some(5)
    );
}

#[test]
fn test_get_without_set_is_none() {
    let store = Store::in_memory();
    assert_eq!(metadata::active_count(&store, SchemeKind::Range).unwrap(), None);
}

#[test]
fn test_set_replaces_previous_record() {
    let store = Store::in_memory();

    metadata::set_active(&store, SchemeKind::Range, 5).unwrap();
    metadata::set_active(&store, SchemeKind::Range, 3).unwrap();

    assert_eq!(
        metadata::active_count(&store, SchemeKind::Range).unwrap(),
        Some(3)
    );
}

#[test]
fn test_kinds_are_independent() {
    let store = Store::in_memory();

    metadata::set_active(&store, SchemeKind::Range, 5).unwrap();
    metadata::set_active(&store, SchemeKind::RoundRobin, 2).unwrap();

    assert_eq!(
        metadata::active_count(&store, SchemeKind::Range).unwrap(),
        Some(5)
    );
    assert_eq!(
        metadata::active_count(&store, SchemeKind::RoundRobin).unwrap(),
        Some(2)
    );
}

#[test]
fn test_set_zero_count_rejected() {
    let store = Store::in_memory();
    let result = metadata::set_active(&store, SchemeKind::Range, 0);
    assert!(matches!(result, Err(PartError::InvalidPartitionCount(0))));
}

// =============================================================================
// Inference Fallback Tests
// =============================================================================

#[test]
fn test_infer_counts_matching_collections() {
    let store = Store::in_memory();
    for i in 0..4 {
        store
            .create_collection(&SchemeKind::Range.partition_name(i))
            .unwrap();
    }

    assert_eq!(metadata::infer_count(&store, SchemeKind::Range).unwrap(), 4);
}

#[test]
fn test_infer_ignores_other_kinds() {
    let store = Store::in_memory();
    for i in 0..3 {
        store
            .create_collection(&SchemeKind::Range.partition_name(i))
            .unwrap();
    }
    for i in 0..2 {
        store
            .create_collection(&SchemeKind::RoundRobin.partition_name(i))
            .unwrap();
    }

    assert_eq!(metadata::infer_count(&store, SchemeKind::Range).unwrap(), 3);
    assert_eq!(
        metadata::infer_count(&store, SchemeKind::RoundRobin).unwrap(),
        2
    );
}

// =============================================================================
// Resolution Tests
// =============================================================================

#[test]
fn test_resolve_prefers_record_over_inference() {
    let store = Store::in_memory();

    // Stale collections from a previous larger build
    for i in 0..8 {
        store
            .create_collection(&SchemeKind::Range.partition_name(i))
            .unwrap();
    }
    metadata::set_active(&store, SchemeKind::Range, 5).unwrap();

    assert_eq!(metadata::resolve_count(&store, SchemeKind::Range).unwrap(), 5);
}

#[test]
fn test_resolve_falls_back_to_inference() {
    let store = Store::in_memory();
    for i in 0..6 {
        store
            .create_collection(&SchemeKind::RoundRobin.partition_name(i))
            .unwrap();
    }

    assert_eq!(
        metadata::resolve_count(&store, SchemeKind::RoundRobin).unwrap(),
        6
    );
}

#[test]
fn test_resolve_with_nothing_fails() {
    let store = Store::in_memory();
    let result = metadata::resolve_count(&store, SchemeKind::Range);
    assert!(matches!(
        result,
        Err(PartError::NoActiveScheme(SchemeKind::Range))
    ));
}
