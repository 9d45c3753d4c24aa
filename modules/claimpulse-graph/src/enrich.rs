//! Enrichment backfill — fill in category/keywords/entities/sentiment on
//! trends that were recorded before any classification ran.
//!
//! The classifier is an external collaborator behind the `ClaimClassifier`
//! trait; this pass owns only the selection of uncategorized trends and
//! the write-back of whatever the classifier returns.

use anyhow::Result;
use tracing::{info, warn};

use claimpulse_common::ClaimClassifier;

use crate::reader::TrendReader;
use crate::writer::TrendWriter;
use crate::GraphClient;

/// Stats from one enrichment run.
#[derive(Debug, Default)]
pub struct EnrichStats {
    pub enriched: u32,
    pub skipped: u32,
}

/// Classify up to `limit` uncategorized trends, busiest first, and write
/// the enrichment fields back. Individual classification failures are
/// logged and skipped; the batch never aborts on one bad record.
pub async fn enrich_uncategorized_trends(
    client: &GraphClient,
    classifier: &dyn ClaimClassifier,
    limit: u32,
) -> Result<EnrichStats> {
    let reader = TrendReader::new(client.clone());
    let writer = TrendWriter::new(client.clone());

    let pending = reader.get_uncategorized(limit).await?;
    let mut stats = EnrichStats::default();

    for (claim_hash, claim_text) in &pending {
        match classifier.classify(claim_text).await {
            Ok(enrichment) => match writer.set_enrichment(claim_hash, &enrichment).await {
                Ok(()) => stats.enriched += 1,
                Err(e) => {
                    warn!(
                        claim_hash = claim_hash.as_str(),
                        error = %e,
                        "Enrichment write failed, skipping trend"
                    );
                    stats.skipped += 1;
                }
            },
            Err(e) => {
                warn!(
                    claim_hash = claim_hash.as_str(),
                    error = %e,
                    "Classification failed, skipping trend"
                );
                stats.skipped += 1;
            }
        }
    }

    info!(
        enriched = stats.enriched,
        skipped = stats.skipped,
        "Enrichment run complete"
    );
    Ok(stats)
}
