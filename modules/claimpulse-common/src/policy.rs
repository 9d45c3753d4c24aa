//! Ranking and retention policy: the constants and small pure functions
//! shared by the writer (record-time scoring) and the velocity batch
//! (periodic rescoring).

use crate::types::TruthRating;

/// Trending score assigned to a brand-new trend, above the 25.0 its first
/// check would earn from the formula, so new claims get initial visibility.
pub const TRENDING_INITIAL_BOOST: f64 = 50.0;

/// Instances older than this are purged independently of their trend.
pub const INSTANCE_RETENTION_DAYS: i64 = 30;

/// Velocity snapshots are kept for a rolling window, then purged.
pub const SNAPSHOT_RETENTION_DAYS: i64 = 30;

/// The velocity batch only touches trends seen within this window.
pub const VELOCITY_BATCH_WINDOW_HOURS: i64 = 48;

/// Bound on trends processed per velocity batch run, top by check_count.
pub const VELOCITY_BATCH_LIMIT: i64 = 100;

/// Step-function recency weight from hours since a trend was last seen.
pub fn recency_weight(hours_since_last_seen: f64) -> f64 {
    if hours_since_last_seen < 24.0 {
        1.0
    } else if hours_since_last_seen < 72.0 {
        0.7
    } else if hours_since_last_seen < 168.0 {
        0.4
    } else {
        0.1
    }
}

/// Composite ranking signal: velocity, volume, recency.
pub fn trending_score(velocity_score: f64, check_count: u32, recency_weight: f64) -> f64 {
    velocity_score * 10.0 + check_count as f64 * 5.0 + recency_weight * 20.0
}

/// Map an average credibility score (0–100) to a display rating.
pub fn rating_from_credibility(avg_credibility: f64) -> TruthRating {
    if avg_credibility >= 80.0 {
        TruthRating::True
    } else if avg_credibility >= 60.0 {
        TruthRating::MostlyTrue
    } else if avg_credibility >= 40.0 {
        TruthRating::Mixed
    } else if avg_credibility >= 20.0 {
        TruthRating::MostlyFalse
    } else {
        TruthRating::False
    }
}
