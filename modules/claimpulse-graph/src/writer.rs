use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use neo4rs::query;
use tracing::{info, warn};
use uuid::Uuid;

use claimpulse_common::{
    claim_hash, normalize_claim, source_domain, ClaimCheck, ScrapedSourceRecord,
    INSTANCE_RETENTION_DAYS, SNAPSHOT_RETENTION_DAYS, TRENDING_INITIAL_BOOST,
};

use crate::scoring::VelocityReading;
use crate::GraphClient;

/// Write-side wrapper for the trend store. Used by the fact-check intake
/// path and the scheduled batch jobs.
pub struct TrendWriter {
    client: GraphClient,
}

/// Counts from a retention purge run.
#[derive(Debug, Default)]
pub struct PurgeStats {
    pub instances: u64,
    pub snapshots: u64,
}

impl TrendWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Record one completed fact-check against its (possibly new) trend and
    /// append the instance row. Returns the trend's claim hash.
    ///
    /// This is a single MERGE statement keyed on the unique claim_hash, so
    /// concurrent calls for the same claim serialize on the row: the
    /// running-aggregate update happens database-side and an insert race
    /// falls through to the update branch instead of creating a duplicate.
    ///
    /// ON MATCH ordering matters: every right-hand side reads only
    /// pre-update values (`check_count + 1` where the new count is wanted),
    /// and the check_count increment is listed last.
    pub async fn record_claim(&self, check: &ClaimCheck) -> Result<String, neo4rs::Error> {
        let normalized = normalize_claim(&check.claim_text);
        let hash = claim_hash(&normalized);
        let now = format_datetime(&Utc::now());
        let domain = check
            .source_url
            .as_deref()
            .and_then(source_domain)
            .unwrap_or_default();

        let q = query(
            "MERGE (t:Trend {claim_hash: $hash})
             ON CREATE SET
                 t.claim_text = $claim_text,
                 t.normalized_text = $normalized,
                 t.category = '',
                 t.subcategory = '',
                 t.keywords = [],
                 t.entities = [],
                 t.sentiment = '',
                 t.first_seen = $now,
                 t.last_seen = $now,
                 t.check_count = 1,
                 t.avg_credibility_score = $score,
                 t.min_credibility_score = $score,
                 t.max_credibility_score = $score,
                 t.velocity_score = 0.0,
                 t.shares_per_hour = 0.0,
                 t.velocity_status = 'dormant',
                 t.trending_score = $initial_boost,
                 t.propaganda_techniques = $techniques
             ON MATCH SET
                 t.avg_credibility_score =
                     (t.avg_credibility_score * t.check_count + $score) / (t.check_count + 1),
                 t.min_credibility_score =
                     CASE WHEN $score < t.min_credibility_score
                          THEN $score ELSE t.min_credibility_score END,
                 t.max_credibility_score =
                     CASE WHEN $score > t.max_credibility_score
                          THEN $score ELSE t.max_credibility_score END,
                 t.last_seen = CASE WHEN $now > t.last_seen THEN $now ELSE t.last_seen END,
                 t.trending_score =
                     t.velocity_score * 10.0 + toFloat(t.check_count + 1) * 5.0 + 20.0,
                 t.propaganda_techniques =
                     t.propaganda_techniques +
                     [x IN $techniques WHERE NOT x IN t.propaganda_techniques],
                 t.check_count = t.check_count + 1
             WITH t
             CREATE (i:Instance {
                 id: $instance_id,
                 report_id: $report_id,
                 checked_at: $now,
                 credibility_score: $score,
                 source_url: $source_url,
                 source_domain: $source_domain,
                 input_type: $input_type
             })-[:CHECK_OF]->(t)
             RETURN t.claim_hash AS claim_hash",
        )
        .param("hash", hash.as_str())
        .param("claim_text", check.claim_text.as_str())
        .param("normalized", normalized.as_str())
        .param("now", now.as_str())
        .param("score", check.credibility_score)
        .param("initial_boost", TRENDING_INITIAL_BOOST)
        .param("techniques", check.propaganda_techniques.clone())
        .param("instance_id", Uuid::new_v4().to_string())
        .param("report_id", check.report_id.as_str())
        .param("source_url", check.source_url.as_deref().unwrap_or(""))
        .param("source_domain", domain.as_str())
        .param("input_type", check.input_type.as_deref().unwrap_or(""));

        let mut stream = self.client.graph.execute(q).await?;
        while stream.next().await?.is_some() {}

        Ok(hash)
    }

    /// Persist one velocity recalculation: append a snapshot row and
    /// overwrite the trend's derived velocity fields plus trending score.
    /// One statement so snapshot and trend fields stay consistent.
    pub async fn persist_velocity(
        &self,
        claim_hash: &str,
        reading: &VelocityReading,
        current_count: u32,
        trending_score: f64,
        now: DateTime<Utc>,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (t:Trend {claim_hash: $hash})
             SET t.velocity_score = $velocity_score,
                 t.shares_per_hour = $shares_per_hour,
                 t.velocity_status = $status,
                 t.trending_score = $trending_score
             WITH t
             CREATE (s:Snapshot {
                 id: $snapshot_id,
                 recorded_at: $now,
                 check_count: $count,
                 velocity_1h: $v1h,
                 velocity_6h: $v6h,
                 velocity_24h: $v24h
             })-[:SNAPSHOT_OF]->(t)",
        )
        .param("hash", claim_hash)
        .param("velocity_score", reading.velocity_score)
        .param("shares_per_hour", reading.shares_per_hour)
        .param("status", reading.status.as_str())
        .param("trending_score", trending_score)
        .param("snapshot_id", Uuid::new_v4().to_string())
        .param("now", format_datetime(&now))
        .param("count", current_count as i64)
        .param("v1h", reading.velocity_1h)
        .param("v6h", reading.velocity_6h)
        .param("v24h", reading.velocity_24h);

        self.client.graph.run(q).await?;
        Ok(())
    }

    /// Write the enrichment fields produced by the classifier.
    pub async fn set_enrichment(
        &self,
        claim_hash: &str,
        enrichment: &claimpulse_common::ClaimEnrichment,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (t:Trend {claim_hash: $hash})
             SET t.category = $category,
                 t.subcategory = $subcategory,
                 t.keywords = $keywords,
                 t.entities = $entities,
                 t.sentiment = $sentiment",
        )
        .param("hash", claim_hash)
        .param("category", enrichment.category.as_str())
        .param("subcategory", enrichment.subcategory.as_str())
        .param("keywords", enrichment.keywords.clone())
        .param("entities", enrichment.entities.clone())
        .param("sentiment", enrichment.sentiment.as_str());

        self.client.graph.run(q).await?;
        Ok(())
    }

    /// Upsert one externally-scraped source record (collaborator-side
    /// write; the dashboard merges these into its feed).
    pub async fn ingest_scraped_source(
        &self,
        record: &ScrapedSourceRecord,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (s:ScrapedSource {id: $id})
             SET s.claim_text = $claim_text,
                 s.rating = $rating,
                 s.category = $category,
                 s.source_url = $source_url,
                 s.source_domain = $source_domain,
                 s.engagement_count = $engagement_count,
                 s.scraped_at = $scraped_at",
        )
        .param("id", record.id.to_string())
        .param("claim_text", record.claim_text.as_str())
        .param("rating", record.rating.as_str())
        .param("category", record.category.as_str())
        .param("source_url", record.source_url.as_str())
        .param("source_domain", record.source_domain.as_str())
        .param("engagement_count", record.engagement_count as i64)
        .param("scraped_at", format_datetime(&record.scraped_at));

        self.client.graph.run(q).await?;
        Ok(())
    }

    /// Purge instances and snapshots past their retention windows.
    /// Trends themselves are never purged.
    pub async fn purge_expired(&self) -> Result<PurgeStats, neo4rs::Error> {
        let mut stats = PurgeStats::default();
        let now = Utc::now();

        let instance_cutoff = format_datetime(&(now - Duration::days(INSTANCE_RETENTION_DAYS)));
        let q = query(
            "MATCH (i:Instance)
             WHERE i.checked_at < $cutoff
             DETACH DELETE i
             RETURN count(i) AS deleted",
        )
        .param("cutoff", instance_cutoff.as_str());
        if let Some(row) = self.client.graph.execute(q).await?.next().await? {
            stats.instances = row.get::<i64>("deleted").unwrap_or(0) as u64;
        }

        let snapshot_cutoff = format_datetime(&(now - Duration::days(SNAPSHOT_RETENTION_DAYS)));
        let q = query(
            "MATCH (s:Snapshot)
             WHERE s.recorded_at < $cutoff
             DETACH DELETE s
             RETURN count(s) AS deleted",
        )
        .param("cutoff", snapshot_cutoff.as_str());
        if let Some(row) = self.client.graph.execute(q).await?.next().await? {
            stats.snapshots = row.get::<i64>("deleted").unwrap_or(0) as u64;
        }

        if stats.instances + stats.snapshots > 0 {
            info!(
                instances = stats.instances,
                snapshots = stats.snapshots,
                "Purged expired rows"
            );
        }

        Ok(stats)
    }

    /// Acquire a named batch-job lock. Returns false if a run is already in
    /// progress. Cleans up stale locks (>30 min) from killed processes.
    ///
    /// The check-and-create is one statement, and the JobLock name
    /// uniqueness constraint backs it: when two acquires race past the
    /// OPTIONAL MATCH, the second CREATE violates the constraint and is
    /// reported as a lost acquire, not an error.
    pub async fn acquire_job_lock(&self, name: &str) -> Result<bool, neo4rs::Error> {
        self.client
            .graph
            .run(
                query(
                    "MATCH (lock:JobLock {name: $name})
                     WHERE lock.started_at < $stale_cutoff
                     DELETE lock",
                )
                .param("name", name)
                .param(
                    "stale_cutoff",
                    format_datetime(&(Utc::now() - Duration::minutes(30))).as_str(),
                ),
            )
            .await?;

        let q = query(
            "OPTIONAL MATCH (existing:JobLock {name: $name})
             WITH existing WHERE existing IS NULL
             CREATE (lock:JobLock {name: $name, started_at: $now})
             RETURN lock IS NOT NULL AS acquired",
        )
        .param("name", name)
        .param("now", format_datetime(&Utc::now()).as_str());

        let outcome = async {
            let mut result = self.client.graph.execute(q).await?;
            result.next().await
        }
        .await;

        match outcome {
            Ok(Some(row)) => Ok(row.get("acquired").unwrap_or(false)),
            // No row returned means the WHERE filtered it out (lock exists)
            Ok(None) => Ok(false),
            Err(e) if is_constraint_violation(&e.to_string()) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Release a named batch-job lock.
    pub async fn release_job_lock(&self, name: &str) -> Result<(), neo4rs::Error> {
        self.client
            .graph
            .run(query("MATCH (lock:JobLock {name: $name}) DELETE lock").param("name", name))
            .await?;
        Ok(())
    }

    /// Remove every node and relationship. Test setup only.
    pub async fn wipe(&self) -> Result<(), neo4rs::Error> {
        warn!("Wiping graph");
        self.client
            .graph
            .run(query("MATCH (n) DETACH DELETE n"))
            .await?;
        Ok(())
    }
}

fn is_constraint_violation(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("constraint") || msg.contains("already exists")
}

/// Format a DateTime<Utc> as a fixed-width datetime string (6-digit
/// fraction, no offset). Fixed width keeps string comparison consistent
/// with chronological order.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Parse a stored datetime string back into a DateTime<Utc>.
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
