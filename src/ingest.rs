//! Ratings file ingestion
//!
//! Loads the `userId::itemId::score::timestamp` delimited format (one
//! record per line, trailing timestamp ignored) into a collection. Blank
//! lines are skipped; anything else malformed aborts the load with a
//! parse error naming the offending line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::error::{PartError, Result};
use crate::rating::Rating;
use crate::storage::StorageBackend;

/// Field separator in the ratings file format
const SEPARATOR: &str = "::";

/// Parse one line of the ratings format
///
/// `line_number` is 1-based and only used for error reporting.
pub fn parse_line(line: &str, line_number: usize) -> Result<Rating> {
    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    if fields.len() != 4 {
        return Err(PartError::Parse {
            line: line_number,
            reason: format!("expected 4 '::'-separated fields, got {}", fields.len()),
        });
    }

    let user_id: u64 = fields[0].trim().parse().map_err(|_| PartError::Parse {
        line: line_number,
        reason: format!("invalid user id {:?}", fields[0]),
    })?;

    let item_id: u64 = fields[1].trim().parse().map_err(|_| PartError::Parse {
        line: line_number,
        reason: format!("invalid item id {:?}", fields[1]),
    })?;

    let score: f64 = fields[2].trim().parse().map_err(|_| PartError::Parse {
        line: line_number,
        reason: format!("invalid score {:?}", fields[2]),
    })?;

    // fields[3] is the timestamp, which this system never uses.

    Ok(Rating::new(user_id, item_id, score))
}

/// Load a ratings file into `collection`, replacing its contents
///
/// Drops the collection if it already exists, recreates it, and bulk-loads
/// every parsed record. Returns the number of records loaded.
pub fn load_ratings<B: StorageBackend>(
    store: &B,
    collection: &str,
    path: &Path,
) -> Result<usize> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut ratings = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        ratings.push(parse_line(&line, i + 1)?);
    }

    if store.collection_exists(collection) {
        store.drop_collection(collection)?;
    }
    store.create_collection(collection)?;

    let loaded = store.bulk_load(collection, ratings)?;
    info!(collection, loaded, path = %path.display(), "ratings file loaded");
    Ok(loaded)
}
