//! # PartDB
//!
//! A single-node partitioned ratings store with:
//! - Value-range and round-robin partitioning over a base collection
//! - Scheme-aware single-record inserts with transactional atomicity
//! - Persisted scheme metadata (no process-wide mutable scheme state)
//! - Deterministic floating-point boundary handling
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                              │
//! │              (single writer: rebuild / insert)               │
//! └─────────┬──────────────────┬───────────────────┬────────────┘
//!           │                  │                   │
//!           ▼                  ▼                   ▼
//!    ┌─────────────┐   ┌──────────────┐   ┌──────────────┐
//!    │   Range     │   │  RoundRobin  │   │   Metadata   │
//!    │ Partitioner │   │  Partitioner │   │    Store     │
//!    └──────┬──────┘   └──────┬───────┘   └──────┬───────┘
//!           │                 │                  │
//!           └────────────┬────┴──────────────────┘
//!                        ▼
//!               ┌────────────────┐
//!               │ StorageBackend │
//!               │  (collections, │
//!               │  transactions) │
//!               └────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod rating;
pub mod scheme;
pub mod metadata;
pub mod partition;
pub mod storage;
pub mod ingest;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use engine::Engine;
pub use error::{PartError, Result};
pub use rating::{Rating, Score};
pub use scheme::{SchemeKind, SchemeRecord};
pub use storage::{StorageBackend, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of PartDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
