//! Error types for PartDB
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::scheme::SchemeKind;

/// Result type alias using PartError
pub type Result<T> = std::result::Result<T, PartError>;

/// Unified error type for PartDB operations
#[derive(Debug, Error)]
pub enum PartError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Snapshot corruption detected: {0}")]
    SnapshotCorruption(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Collection already exists: {0}")]
    CollectionExists(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Partitioning Errors
    // -------------------------------------------------------------------------
    #[error("Invalid partition count: {0} (must be >= 1)")]
    InvalidPartitionCount(usize),

    #[error("No partition scheme configured for {0}")]
    NoActiveScheme(SchemeKind),

    #[error("Atomicity violation: {0}")]
    Atomicity(String),

    // -------------------------------------------------------------------------
    // Ingestion Errors
    // -------------------------------------------------------------------------
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}
