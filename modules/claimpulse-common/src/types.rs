use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// --- Enums ---

/// Viral-status classification of a trend, recomputed fresh on every
/// velocity cycle. Ordering matters: dormant < slow < active < emerging < viral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityStatus {
    Dormant,
    Slow,
    Active,
    Emerging,
    Viral,
}

impl VelocityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VelocityStatus::Dormant => "dormant",
            VelocityStatus::Slow => "slow",
            VelocityStatus::Active => "active",
            VelocityStatus::Emerging => "emerging",
            VelocityStatus::Viral => "viral",
        }
    }

    /// Parse a stored status string. Unknown values fall back to Dormant.
    pub fn parse(s: &str) -> Self {
        match s {
            "slow" => VelocityStatus::Slow,
            "active" => VelocityStatus::Active,
            "emerging" => VelocityStatus::Emerging,
            "viral" => VelocityStatus::Viral,
            _ => VelocityStatus::Dormant,
        }
    }
}

impl std::fmt::Display for VelocityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Truthfulness rating derived from a trend's average credibility score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruthRating {
    True,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
}

impl std::fmt::Display for TruthRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TruthRating::True => write!(f, "True"),
            TruthRating::MostlyTrue => write!(f, "Mostly True"),
            TruthRating::Mixed => write!(f, "Mixed"),
            TruthRating::MostlyFalse => write!(f, "Mostly False"),
            TruthRating::False => write!(f, "False"),
        }
    }
}

// --- Inbound ---

/// One completed fact-check, as handed to `record_claim`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimCheck {
    pub claim_text: String,
    pub report_id: String,
    /// 0–100 credibility scale.
    pub credibility_score: f64,
    pub source_url: Option<String>,
    pub input_type: Option<String>,
    #[serde(default)]
    pub propaganda_techniques: Vec<String>,
}

// --- Stored records ---

/// The deduplicated aggregate record for one distinct claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendRecord {
    pub claim_hash: String,
    pub claim_text: String,
    pub normalized_text: String,
    pub category: String,
    pub subcategory: String,
    pub keywords: Vec<String>,
    pub entities: Vec<String>,
    pub sentiment: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub check_count: u32,
    pub avg_credibility_score: f64,
    pub min_credibility_score: f64,
    pub max_credibility_score: f64,
    pub velocity_score: f64,
    pub shares_per_hour: f64,
    pub velocity_status: VelocityStatus,
    pub trending_score: f64,
    pub propaganda_techniques: Vec<String>,
}

/// Count-at-time-T sample for one trend, with the per-window velocities
/// that were derived when it was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub recorded_at: DateTime<Utc>,
    pub check_count: u32,
    pub velocity_1h: f64,
    pub velocity_6h: f64,
    pub velocity_24h: f64,
}

/// Externally-scraped claim record, written by the scraping pipeline and
/// merged into the dashboard feed alongside internal trends. Carries its
/// own rating/category metadata; this core never rescores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedSourceRecord {
    pub id: Uuid,
    pub claim_text: String,
    pub rating: String,
    pub category: String,
    pub source_url: String,
    pub source_domain: String,
    pub engagement_count: u32,
    pub scraped_at: DateTime<Utc>,
}

// --- Enrichment ---

/// Structured enrichment for a claim, produced by an external classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimEnrichment {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sentiment: String,
}

/// External classification collaborator used by the enrichment pass.
#[async_trait]
pub trait ClaimClassifier: Send + Sync {
    async fn classify(&self, claim_text: &str) -> Result<ClaimEnrichment>;
}
