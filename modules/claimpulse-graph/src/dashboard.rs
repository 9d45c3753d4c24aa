//! Dashboard query layer: merges internal trends with externally-scraped
//! source records into one ranked feed. Read-only composition — upstream
//! fields are reused, never rescored.

use chrono::{DateTime, Utc};

use claimpulse_common::{rating_from_credibility, ScrapedSourceRecord, TrendRecord};

use crate::reader::TrendReader;
use crate::GraphClient;

/// How many of each stream the feed pulls before merging.
const FEED_FETCH_LIMIT: u32 = 500;

/// The feed considers trends seen within this many hours.
const FEED_TIMEFRAME_HOURS: i64 = 24 * 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOrigin {
    /// From the internal trend store.
    Trend,
    /// From the external scraping pipeline.
    Scraped,
}

/// One row of the merged feed.
#[derive(Debug, Clone)]
pub struct DashboardEntry {
    pub claim_text: String,
    pub rating: String,
    pub category: String,
    pub origin: EntryOrigin,
    /// Velocity score for internal trends; engagement_count / 10 as a
    /// crude proxy for scraped records. Descending sort key.
    pub score: f64,
    pub last_activity: DateTime<Utc>,
}

/// One page of the merged feed.
#[derive(Debug, Clone)]
pub struct DashboardPage {
    pub entries: Vec<DashboardEntry>,
    /// Matching entries across all pages.
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

/// Read-side feed builder over the trend store + scraped-source store.
pub struct DashboardFeed {
    reader: TrendReader,
}

impl DashboardFeed {
    pub fn new(client: GraphClient) -> Self {
        Self {
            reader: TrendReader::new(client),
        }
    }

    /// Fetch both streams and return one merged, searched, ranked page.
    /// `page` is zero-based.
    pub async fn fetch(
        &self,
        search: Option<&str>,
        page: usize,
        per_page: usize,
    ) -> Result<DashboardPage, neo4rs::Error> {
        // Fetched in feed-sort order (velocity) so the cut at the fetch
        // limit cannot drop a trend that would have ranked on page one.
        let trends = self
            .reader
            .get_recent_by_velocity(FEED_FETCH_LIMIT, FEED_TIMEFRAME_HOURS)
            .await?;
        let scraped = self.reader.list_scraped_sources(FEED_FETCH_LIMIT).await?;

        Ok(merge_entries(&trends, &scraped, search, page, per_page))
    }
}

/// Pure merge: concatenate, filter by case-insensitive substring search,
/// sort descending by score (recency breaks ties), paginate.
pub(crate) fn merge_entries(
    trends: &[TrendRecord],
    scraped: &[ScrapedSourceRecord],
    search: Option<&str>,
    page: usize,
    per_page: usize,
) -> DashboardPage {
    let mut entries: Vec<DashboardEntry> = Vec::with_capacity(trends.len() + scraped.len());

    for t in trends {
        entries.push(DashboardEntry {
            claim_text: t.claim_text.clone(),
            rating: rating_from_credibility(t.avg_credibility_score).to_string(),
            category: t.category.clone(),
            origin: EntryOrigin::Trend,
            score: t.velocity_score,
            last_activity: t.last_seen,
        });
    }

    for s in scraped {
        entries.push(DashboardEntry {
            claim_text: s.claim_text.clone(),
            rating: s.rating.clone(),
            category: s.category.clone(),
            origin: EntryOrigin::Scraped,
            score: s.engagement_count as f64 / 10.0,
            last_activity: s.scraped_at,
        });
    }

    if let Some(needle) = search {
        let needle = needle.to_lowercase();
        entries.retain(|e| e.claim_text.to_lowercase().contains(&needle));
    }

    entries.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.last_activity.cmp(&a.last_activity))
    });

    let total = entries.len();
    let entries: Vec<DashboardEntry> = entries
        .into_iter()
        .skip(page.saturating_mul(per_page))
        .take(per_page)
        .collect();

    DashboardPage {
        entries,
        total,
        page,
        per_page,
    }
}
