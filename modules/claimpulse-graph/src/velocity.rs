//! Velocity snapshot engine: the I/O shell around the pure math in
//! `scoring.rs`. Each cycle reads the trend's current count plus its 24h
//! snapshot history, computes the reading, persists one new snapshot, and
//! overwrites the trend's derived velocity fields.

use chrono::{Duration, Utc};
use tracing::{info, warn};

use claimpulse_common::{
    recency_weight, trending_score, VELOCITY_BATCH_LIMIT, VELOCITY_BATCH_WINDOW_HOURS,
};

use crate::reader::TrendReader;
use crate::scoring::{compute_velocity, VelocityConfig, VelocityReading};
use crate::writer::TrendWriter;
use crate::GraphClient;

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct VelocityBatchStats {
    pub processed: u32,
    pub skipped: u32,
}

/// Recalculate velocity for one trend and persist the result.
///
/// A trend with no snapshot history gets an all-zero reading and dormant
/// status — the valid steady state for a brand-new claim, not an error.
/// Returns None if the trend does not exist.
pub async fn calculate_velocity(
    client: &GraphClient,
    claim_hash: &str,
    cfg: &VelocityConfig,
) -> Result<Option<VelocityReading>, neo4rs::Error> {
    let reader = TrendReader::new(client.clone());
    let writer = TrendWriter::new(client.clone());
    let now = Utc::now();

    let Some(trend) = reader.get_trend(claim_hash).await? else {
        return Ok(None);
    };

    let snapshots = reader
        .get_snapshots_since(claim_hash, now - Duration::hours(24))
        .await?;

    let reading = compute_velocity(trend.check_count, &snapshots, now, cfg);

    // Unlike record time, recency is not necessarily fresh here: the batch
    // revisits everything seen in the last 48h, so idle trends decay.
    let hours_idle = (now - trend.last_seen).num_minutes() as f64 / 60.0;
    let trending = trending_score(
        reading.velocity_score,
        trend.check_count,
        recency_weight(hours_idle),
    );

    writer
        .persist_velocity(claim_hash, &reading, trend.check_count, trending, now)
        .await?;

    Ok(Some(reading))
}

/// Recalculate velocity for every trend seen within the batch window,
/// busiest first, bounded. Individual failures are logged and skipped —
/// one bad record never aborts the batch.
pub async fn batch_calculate_velocity(
    client: &GraphClient,
    cfg: &VelocityConfig,
) -> Result<VelocityBatchStats, neo4rs::Error> {
    let reader = TrendReader::new(client.clone());
    let candidates = reader
        .get_batch_candidates(VELOCITY_BATCH_WINDOW_HOURS, VELOCITY_BATCH_LIMIT)
        .await?;

    let mut stats = VelocityBatchStats::default();

    for claim_hash in &candidates {
        match calculate_velocity(client, claim_hash, cfg).await {
            Ok(Some(_)) => stats.processed += 1,
            Ok(None) => {
                warn!(claim_hash = claim_hash.as_str(), "Trend vanished mid-batch, skipping");
                stats.skipped += 1;
            }
            Err(e) => {
                warn!(
                    claim_hash = claim_hash.as_str(),
                    error = %e,
                    "Velocity recalculation failed, skipping"
                );
                stats.skipped += 1;
            }
        }
    }

    info!(
        processed = stats.processed,
        skipped = stats.skipped,
        "Velocity batch complete"
    );
    Ok(stats)
}
