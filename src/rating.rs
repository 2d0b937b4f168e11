//! Rating records
//!
//! The record type the whole system distributes: who rated what, and how
//! highly. Scores live in the fixed domain `[0.0, 5.0]`.

use serde::{Deserialize, Serialize};

/// Lower bound of the score domain
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of the score domain
pub const SCORE_MAX: f64 = 5.0;

/// A rating score, clamped into `[0.0, 5.0]` at construction
///
/// Upstream data is assumed pre-validated, but scores are defensively
/// bounded: out-of-domain values clamp to the nearest endpoint and NaN
/// clamps to `0.0`, so every downstream index computation stays total.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    /// Create a score, clamping into the valid domain
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Score(SCORE_MIN);
        }
        Score(value.clamp(SCORE_MIN, SCORE_MAX))
    }

    /// The raw score value (guaranteed in `[0.0, 5.0]`)
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score::new(value)
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single rating record
///
/// Immutable once created. A record is held by the base collection and by
/// at most one partition collection of each scheme kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// User who produced the rating
    pub user_id: u64,

    /// Item being rated
    pub item_id: u64,

    /// The score, in `[0.0, 5.0]`
    pub score: Score,
}

impl Rating {
    /// Create a rating (score is clamped into the valid domain)
    pub fn new(user_id: u64, item_id: u64, score: f64) -> Self {
        Self {
            user_id,
            item_id,
            score: Score::new(score),
        }
    }
}
