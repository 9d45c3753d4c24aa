//! Interval scheduler for the three recurring jobs: velocity batch,
//! enrichment backfill, retention purge.
//!
//! Velocity runs under the shared job lock so multiple scheduler
//! instances never recompute the same window. Enrichment only runs when
//! a classifier is configured. Each cycle logs its stats; a failed cycle
//! is logged without killing the loop.

use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use claimpulse_common::{ClaimClassifier, ClaimPulseError, Config};
use claimpulse_graph::{
    batch_calculate_velocity, enrich_uncategorized_trends, GraphClient, TrendWriter,
    VelocityConfig,
};

/// Lock name shared by every scheduler instance's velocity batch.
pub const VELOCITY_LOCK: &str = "velocity-batch";

const PURGE_INTERVAL_HOURS: u64 = 24;

pub struct Scheduler {
    client: GraphClient,
    config: Config,
    classifier: Option<Box<dyn ClaimClassifier>>,
}

impl Scheduler {
    pub fn new(
        client: GraphClient,
        config: Config,
        classifier: Option<Box<dyn ClaimClassifier>>,
    ) -> Self {
        Self {
            client,
            config,
            classifier,
        }
    }

    /// Run the job loop until the process is stopped.
    pub async fn run(&self) -> Result<()> {
        let mut velocity_tick =
            interval(Duration::from_secs(self.config.velocity_interval_minutes * 60));
        let mut enrich_tick =
            interval(Duration::from_secs(self.config.enrich_interval_minutes * 60));
        let mut purge_tick = interval(Duration::from_secs(PURGE_INTERVAL_HOURS * 3600));
        velocity_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        enrich_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        purge_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            velocity_minutes = self.config.velocity_interval_minutes,
            enrich_minutes = self.config.enrich_interval_minutes,
            enrichment_enabled = self.classifier.is_some(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = velocity_tick.tick() => {
                    match self.velocity_cycle().await {
                        Ok(()) => {}
                        Err(ClaimPulseError::JobLockConflict) => {
                            warn!("Velocity batch already running elsewhere, skipping");
                        }
                        Err(e) => error!(error = %e, "Velocity cycle failed"),
                    }
                }
                _ = enrich_tick.tick() => {
                    if let Err(e) = self.enrich_cycle().await {
                        error!(error = %e, "Enrichment cycle failed");
                    }
                }
                _ = purge_tick.tick() => {
                    if let Err(e) = self.purge_cycle().await {
                        error!(error = %e, "Purge cycle failed");
                    }
                }
            }
        }
    }

    /// One velocity batch under the shared lock. `JobLockConflict` when
    /// another instance holds it.
    pub async fn velocity_cycle(&self) -> Result<(), ClaimPulseError> {
        let writer = TrendWriter::new(self.client.clone());
        if !writer.acquire_job_lock(VELOCITY_LOCK).await.map_err(db_err)? {
            return Err(ClaimPulseError::JobLockConflict);
        }

        let result = batch_calculate_velocity(&self.client, &VelocityConfig::default()).await;
        writer.release_job_lock(VELOCITY_LOCK).await.map_err(db_err)?;

        let stats = result.map_err(db_err)?;
        info!(
            processed = stats.processed,
            skipped = stats.skipped,
            "Velocity cycle complete"
        );
        Ok(())
    }

    /// One enrichment backfill. A no-op without a configured classifier.
    pub async fn enrich_cycle(&self) -> Result<(), ClaimPulseError> {
        let Some(classifier) = self.classifier.as_deref() else {
            return Ok(());
        };
        let stats =
            enrich_uncategorized_trends(&self.client, classifier, self.config.enrich_batch_limit)
                .await?;
        info!(
            enriched = stats.enriched,
            skipped = stats.skipped,
            "Enrichment cycle complete"
        );
        Ok(())
    }

    /// One retention purge.
    pub async fn purge_cycle(&self) -> Result<(), ClaimPulseError> {
        let writer = TrendWriter::new(self.client.clone());
        let stats = writer.purge_expired().await.map_err(db_err)?;
        info!(
            instances = stats.instances,
            snapshots = stats.snapshots,
            "Purge cycle complete"
        );
        Ok(())
    }
}

fn db_err(e: neo4rs::Error) -> ClaimPulseError {
    ClaimPulseError::Database(e.to_string())
}
