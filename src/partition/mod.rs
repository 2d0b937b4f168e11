//! Partition Module
//!
//! The partition-assignment algorithms.
//!
//! ## Responsibilities
//! - Map a record to exactly one partition index under each scheme
//! - Build the full partition set from a base collection
//!
//! Index computations are pure functions; bulk builds go through the
//! [`StorageBackend`](crate::storage::StorageBackend) selects. Both paths
//! share the same index rule for a given kind, so a bulk build and a later
//! single-record insert can never disagree about where a record belongs.

pub mod range;
pub mod round_robin;
