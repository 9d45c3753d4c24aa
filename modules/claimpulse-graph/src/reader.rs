use chrono::{DateTime, Duration, Utc};
use neo4rs::query;

use claimpulse_common::{ScrapedSourceRecord, SnapshotRecord, TrendRecord, VelocityStatus};
use uuid::Uuid;

use crate::writer::{format_datetime, parse_datetime};
use crate::GraphClient;

/// Read-only wrapper for the trend store. Used by the presentation layer
/// and the batch jobs. Exposes timeframe-scoped aggregate queries only —
/// no raw Cypher.
pub struct TrendReader {
    client: GraphClient,
}

/// One category's slice of the trend population in a timeframe.
#[derive(Debug, Clone)]
pub struct CategoryCount {
    pub category: String,
    pub trend_count: u64,
    pub check_count: u64,
}

/// Check volume attributed to one source domain in a timeframe.
#[derive(Debug, Clone)]
pub struct DomainCount {
    pub domain: String,
    pub instance_count: u64,
}

/// Headline totals for the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardStats {
    pub total_trends: u64,
    pub total_checks: u64,
    pub active_last_24h: u64,
    pub viral_count: u64,
    pub avg_credibility: f64,
}

const TREND_PROJECTION: &str = "t.claim_hash AS claim_hash,
    t.claim_text AS claim_text,
    t.normalized_text AS normalized_text,
    t.category AS category,
    t.subcategory AS subcategory,
    t.keywords AS keywords,
    t.entities AS entities,
    t.sentiment AS sentiment,
    t.first_seen AS first_seen,
    t.last_seen AS last_seen,
    t.check_count AS check_count,
    t.avg_credibility_score AS avg_credibility_score,
    t.min_credibility_score AS min_credibility_score,
    t.max_credibility_score AS max_credibility_score,
    t.velocity_score AS velocity_score,
    t.shares_per_hour AS shares_per_hour,
    t.velocity_status AS velocity_status,
    t.trending_score AS trending_score,
    t.propaganda_techniques AS propaganda_techniques";

impl TrendReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Fetch one trend by its claim hash.
    pub async fn get_trend(&self, claim_hash: &str) -> Result<Option<TrendRecord>, neo4rs::Error> {
        let q = query(&format!(
            "MATCH (t:Trend {{claim_hash: $hash}}) RETURN {TREND_PROJECTION}"
        ))
        .param("hash", claim_hash);

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            return Ok(Some(row_to_trend(&row)));
        }
        Ok(None)
    }

    /// Trends seen within the timeframe, optionally category-filtered,
    /// ordered by trending score then check volume.
    pub async fn get_trending_claims(
        &self,
        limit: u32,
        category: Option<&str>,
        timeframe_hours: i64,
    ) -> Result<Vec<TrendRecord>, neo4rs::Error> {
        let cutoff = format_datetime(&(Utc::now() - Duration::hours(timeframe_hours)));
        let category_clause = if category.is_some() {
            "AND t.category = $category"
        } else {
            ""
        };

        let cypher = format!(
            "MATCH (t:Trend)
             WHERE t.last_seen >= $cutoff
               {category_clause}
             RETURN {TREND_PROJECTION}
             ORDER BY t.trending_score DESC, t.check_count DESC
             LIMIT $limit"
        );

        let mut q = query(&cypher)
            .param("cutoff", cutoff.as_str())
            .param("limit", limit as i64);
        if let Some(cat) = category {
            q = q.param("category", cat);
        }

        let mut trends = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            trends.push(row_to_trend(&row));
        }
        Ok(trends)
    }

    /// Trends seen within the timeframe ordered by the dashboard feed's
    /// sort key, velocity. Recency breaks ties so the cut at `limit`
    /// matches the feed's own ordering.
    pub async fn get_recent_by_velocity(
        &self,
        limit: u32,
        timeframe_hours: i64,
    ) -> Result<Vec<TrendRecord>, neo4rs::Error> {
        let cutoff = format_datetime(&(Utc::now() - Duration::hours(timeframe_hours)));
        let cypher = format!(
            "MATCH (t:Trend)
             WHERE t.last_seen >= $cutoff
             RETURN {TREND_PROJECTION}
             ORDER BY t.velocity_score DESC, t.last_seen DESC
             LIMIT $limit"
        );
        let q = query(&cypher)
            .param("cutoff", cutoff.as_str())
            .param("limit", limit as i64);

        let mut trends = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            trends.push(row_to_trend(&row));
        }
        Ok(trends)
    }

    /// Trend and check counts grouped by category within the timeframe.
    /// Unenriched trends land in the empty-string category.
    pub async fn get_category_breakdown(
        &self,
        timeframe_hours: i64,
    ) -> Result<Vec<CategoryCount>, neo4rs::Error> {
        let cutoff = format_datetime(&(Utc::now() - Duration::hours(timeframe_hours)));
        let q = query(
            "MATCH (t:Trend)
             WHERE t.last_seen >= $cutoff
             RETURN t.category AS category,
                    count(t) AS trend_count,
                    sum(t.check_count) AS check_count
             ORDER BY trend_count DESC",
        )
        .param("cutoff", cutoff.as_str());

        let mut out = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            out.push(CategoryCount {
                category: row.get("category").unwrap_or_default(),
                trend_count: row.get::<i64>("trend_count").unwrap_or(0) as u64,
                check_count: row.get::<i64>("check_count").unwrap_or(0) as u64,
            });
        }
        Ok(out)
    }

    /// Most-checked source domains within the timeframe.
    pub async fn get_top_domains(
        &self,
        limit: u32,
        timeframe_hours: i64,
    ) -> Result<Vec<DomainCount>, neo4rs::Error> {
        let cutoff = format_datetime(&(Utc::now() - Duration::hours(timeframe_hours)));
        let q = query(
            "MATCH (i:Instance)
             WHERE i.checked_at >= $cutoff AND i.source_domain <> ''
             RETURN i.source_domain AS domain, count(i) AS instance_count
             ORDER BY instance_count DESC
             LIMIT $limit",
        )
        .param("cutoff", cutoff.as_str())
        .param("limit", limit as i64);

        let mut out = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            out.push(DomainCount {
                domain: row.get("domain").unwrap_or_default(),
                instance_count: row.get::<i64>("instance_count").unwrap_or(0) as u64,
            });
        }
        Ok(out)
    }

    /// Headline totals: trend/check volume, 24h activity, viral count,
    /// population-wide average credibility.
    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats, neo4rs::Error> {
        let day_ago = format_datetime(&(Utc::now() - Duration::hours(24)));
        let q = query(
            "MATCH (t:Trend)
             RETURN count(t) AS total_trends,
                    sum(t.check_count) AS total_checks,
                    count(CASE WHEN t.last_seen >= $day_ago THEN 1 END) AS active_last_24h,
                    count(CASE WHEN t.velocity_status = 'viral' THEN 1 END) AS viral_count,
                    avg(t.avg_credibility_score) AS avg_credibility",
        )
        .param("day_ago", day_ago.as_str());

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            return Ok(DashboardStats {
                total_trends: row.get::<i64>("total_trends").unwrap_or(0) as u64,
                total_checks: row.get::<i64>("total_checks").unwrap_or(0) as u64,
                active_last_24h: row.get::<i64>("active_last_24h").unwrap_or(0) as u64,
                viral_count: row.get::<i64>("viral_count").unwrap_or(0) as u64,
                avg_credibility: row.get("avg_credibility").unwrap_or(0.0),
            });
        }
        Ok(DashboardStats::default())
    }

    /// Snapshots for one trend recorded at or after `since`, oldest first.
    pub async fn get_snapshots_since(
        &self,
        claim_hash: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SnapshotRecord>, neo4rs::Error> {
        let q = query(
            "MATCH (s:Snapshot)-[:SNAPSHOT_OF]->(t:Trend {claim_hash: $hash})
             WHERE s.recorded_at >= $since
             RETURN s.recorded_at AS recorded_at,
                    s.check_count AS check_count,
                    s.velocity_1h AS velocity_1h,
                    s.velocity_6h AS velocity_6h,
                    s.velocity_24h AS velocity_24h
             ORDER BY s.recorded_at ASC",
        )
        .param("hash", claim_hash)
        .param("since", format_datetime(&since).as_str());

        let mut out = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            let recorded_at_str: String = row.get("recorded_at").unwrap_or_default();
            out.push(SnapshotRecord {
                recorded_at: parse_datetime(&recorded_at_str).unwrap_or_else(Utc::now),
                check_count: row.get::<i64>("check_count").unwrap_or(0) as u32,
                velocity_1h: row.get("velocity_1h").unwrap_or(0.0),
                velocity_6h: row.get("velocity_6h").unwrap_or(0.0),
                velocity_24h: row.get("velocity_24h").unwrap_or(0.0),
            });
        }
        Ok(out)
    }

    /// Claim hashes of trends seen within the batch window, busiest first.
    /// Feeds the velocity batch its bounded slice.
    pub async fn get_batch_candidates(
        &self,
        window_hours: i64,
        limit: i64,
    ) -> Result<Vec<String>, neo4rs::Error> {
        let cutoff = format_datetime(&(Utc::now() - Duration::hours(window_hours)));
        let q = query(
            "MATCH (t:Trend)
             WHERE t.last_seen >= $cutoff
             RETURN t.claim_hash AS claim_hash
             ORDER BY t.check_count DESC
             LIMIT $limit",
        )
        .param("cutoff", cutoff.as_str())
        .param("limit", limit);

        let mut out = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            out.push(row.get("claim_hash").unwrap_or_default());
        }
        Ok(out)
    }

    /// Trends still missing a category, for the enrichment backfill.
    pub async fn get_uncategorized(
        &self,
        limit: u32,
    ) -> Result<Vec<(String, String)>, neo4rs::Error> {
        let q = query(
            "MATCH (t:Trend)
             WHERE t.category = '' OR t.category IS NULL
             RETURN t.claim_hash AS claim_hash, t.claim_text AS claim_text
             ORDER BY t.check_count DESC
             LIMIT $limit",
        )
        .param("limit", limit as i64);

        let mut out = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            let hash: String = row.get("claim_hash").unwrap_or_default();
            let text: String = row.get("claim_text").unwrap_or_default();
            out.push((hash, text));
        }
        Ok(out)
    }

    /// Externally-scraped records, newest first, for the dashboard merge.
    pub async fn list_scraped_sources(
        &self,
        limit: u32,
    ) -> Result<Vec<ScrapedSourceRecord>, neo4rs::Error> {
        let q = query(
            "MATCH (s:ScrapedSource)
             RETURN s.id AS id,
                    s.claim_text AS claim_text,
                    s.rating AS rating,
                    s.category AS category,
                    s.source_url AS source_url,
                    s.source_domain AS source_domain,
                    s.engagement_count AS engagement_count,
                    s.scraped_at AS scraped_at
             ORDER BY s.scraped_at DESC
             LIMIT $limit",
        )
        .param("limit", limit as i64);

        let mut out = Vec::new();
        let mut stream = self.client.graph.execute(q).await?;
        while let Some(row) = stream.next().await? {
            let id_str: String = row.get("id").unwrap_or_default();
            let scraped_at_str: String = row.get("scraped_at").unwrap_or_default();
            out.push(ScrapedSourceRecord {
                id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
                claim_text: row.get("claim_text").unwrap_or_default(),
                rating: row.get("rating").unwrap_or_default(),
                category: row.get("category").unwrap_or_default(),
                source_url: row.get("source_url").unwrap_or_default(),
                source_domain: row.get("source_domain").unwrap_or_default(),
                engagement_count: row.get::<i64>("engagement_count").unwrap_or(0) as u32,
                scraped_at: parse_datetime(&scraped_at_str).unwrap_or_else(Utc::now),
            });
        }
        Ok(out)
    }

    /// Number of instance rows attached to a trend.
    pub async fn count_instances(&self, claim_hash: &str) -> Result<u64, neo4rs::Error> {
        let q = query(
            "MATCH (i:Instance)-[:CHECK_OF]->(t:Trend {claim_hash: $hash})
             RETURN count(i) AS cnt",
        )
        .param("hash", claim_hash);

        let mut stream = self.client.graph.execute(q).await?;
        if let Some(row) = stream.next().await? {
            return Ok(row.get::<i64>("cnt").unwrap_or(0) as u64);
        }
        Ok(0)
    }
}

pub(crate) fn row_to_trend(row: &neo4rs::Row) -> TrendRecord {
    let first_seen_str: String = row.get("first_seen").unwrap_or_default();
    let last_seen_str: String = row.get("last_seen").unwrap_or_default();
    let status_str: String = row.get("velocity_status").unwrap_or_default();

    TrendRecord {
        claim_hash: row.get("claim_hash").unwrap_or_default(),
        claim_text: row.get("claim_text").unwrap_or_default(),
        normalized_text: row.get("normalized_text").unwrap_or_default(),
        category: row.get("category").unwrap_or_default(),
        subcategory: row.get("subcategory").unwrap_or_default(),
        keywords: row.get("keywords").unwrap_or_default(),
        entities: row.get("entities").unwrap_or_default(),
        sentiment: row.get("sentiment").unwrap_or_default(),
        first_seen: parse_datetime(&first_seen_str).unwrap_or_else(Utc::now),
        last_seen: parse_datetime(&last_seen_str).unwrap_or_else(Utc::now),
        check_count: row.get::<i64>("check_count").unwrap_or(0) as u32,
        avg_credibility_score: row.get("avg_credibility_score").unwrap_or(0.0),
        min_credibility_score: row.get("min_credibility_score").unwrap_or(0.0),
        max_credibility_score: row.get("max_credibility_score").unwrap_or(0.0),
        velocity_score: row.get("velocity_score").unwrap_or(0.0),
        shares_per_hour: row.get("shares_per_hour").unwrap_or(0.0),
        velocity_status: VelocityStatus::parse(&status_str),
        trending_score: row.get("trending_score").unwrap_or(0.0),
        propaganda_techniques: row.get("propaganda_techniques").unwrap_or_default(),
    }
}
