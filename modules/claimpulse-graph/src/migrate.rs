use neo4rs::query;
use tracing::{info, warn};

use crate::GraphClient;

/// Idempotent schema migrations: constraints and indexes.
///
/// Statements are written in Neo4j 5 syntax (`CREATE CONSTRAINT ... FOR ...
/// REQUIRE`, with `IF NOT EXISTS`). Stores that only speak the legacy
/// `CREATE CONSTRAINT ON ... ASSERT` form (Memgraph, Neo4j 4) reject the
/// new syntax, so each statement carries a legacy fallback.
///
/// Existence (NOT NULL) constraints are deliberately absent: Neo4j gates
/// them behind Enterprise, and the writer already populates every field on
/// both MERGE branches.
pub async fn migrate(client: &GraphClient) -> Result<(), neo4rs::Error> {
    let g = &client.graph;

    info!("Running schema migrations...");

    // --- Uniqueness constraints ---
    // Trend identity is the claim hash; the MERGE in record_claim relies on
    // this constraint for its insert-or-update atomicity. The JobLock name
    // constraint is what makes a lost acquire race fail instead of
    // creating a second lock node.
    let constraints = [
        (
            "CREATE CONSTRAINT trend_claim_hash IF NOT EXISTS FOR (n:Trend) REQUIRE n.claim_hash IS UNIQUE",
            "CREATE CONSTRAINT ON (n:Trend) ASSERT n.claim_hash IS UNIQUE",
        ),
        (
            "CREATE CONSTRAINT instance_id IF NOT EXISTS FOR (n:Instance) REQUIRE n.id IS UNIQUE",
            "CREATE CONSTRAINT ON (n:Instance) ASSERT n.id IS UNIQUE",
        ),
        (
            "CREATE CONSTRAINT snapshot_id IF NOT EXISTS FOR (n:Snapshot) REQUIRE n.id IS UNIQUE",
            "CREATE CONSTRAINT ON (n:Snapshot) ASSERT n.id IS UNIQUE",
        ),
        (
            "CREATE CONSTRAINT scraped_source_id IF NOT EXISTS FOR (n:ScrapedSource) REQUIRE n.id IS UNIQUE",
            "CREATE CONSTRAINT ON (n:ScrapedSource) ASSERT n.id IS UNIQUE",
        ),
        (
            "CREATE CONSTRAINT job_lock_name IF NOT EXISTS FOR (n:JobLock) REQUIRE n.name IS UNIQUE",
            "CREATE CONSTRAINT ON (n:JobLock) ASSERT n.name IS UNIQUE",
        ),
    ];

    for (preferred, legacy) in &constraints {
        run_with_fallback(g, preferred, legacy).await?;
    }
    info!("Uniqueness constraints created");

    // --- Property indexes ---
    // last_seen drives every timeframe filter; recorded_at drives the
    // snapshot lookback and retention; source_domain the top-domains query.
    let indexes = [
        (
            "CREATE INDEX trend_last_seen IF NOT EXISTS FOR (n:Trend) ON (n.last_seen)",
            "CREATE INDEX ON :Trend(last_seen)",
        ),
        (
            "CREATE INDEX trend_category IF NOT EXISTS FOR (n:Trend) ON (n.category)",
            "CREATE INDEX ON :Trend(category)",
        ),
        (
            "CREATE INDEX trend_trending_score IF NOT EXISTS FOR (n:Trend) ON (n.trending_score)",
            "CREATE INDEX ON :Trend(trending_score)",
        ),
        (
            "CREATE INDEX instance_checked_at IF NOT EXISTS FOR (n:Instance) ON (n.checked_at)",
            "CREATE INDEX ON :Instance(checked_at)",
        ),
        (
            "CREATE INDEX instance_source_domain IF NOT EXISTS FOR (n:Instance) ON (n.source_domain)",
            "CREATE INDEX ON :Instance(source_domain)",
        ),
        (
            "CREATE INDEX snapshot_recorded_at IF NOT EXISTS FOR (n:Snapshot) ON (n.recorded_at)",
            "CREATE INDEX ON :Snapshot(recorded_at)",
        ),
        (
            "CREATE INDEX scraped_source_scraped_at IF NOT EXISTS FOR (n:ScrapedSource) ON (n.scraped_at)",
            "CREATE INDEX ON :ScrapedSource(scraped_at)",
        ),
    ];

    for (preferred, legacy) in &indexes {
        run_with_fallback(g, preferred, legacy).await?;
    }
    info!("Property indexes created");

    info!("Schema migrations complete");
    Ok(())
}

/// Run the Neo4j 5 form; on a syntax rejection retry the legacy form.
/// "Already exists" is success either way.
async fn run_with_fallback(
    g: &neo4rs::Graph,
    preferred: &str,
    legacy: &str,
) -> Result<(), neo4rs::Error> {
    match g.run(query(preferred)).await {
        Ok(_) => Ok(()),
        Err(e) if is_already_exists(&e.to_string()) => Ok(()),
        Err(e) if is_syntax_rejection(&e.to_string()) => {
            warn!(
                "Store rejected Neo4j 5 DDL, retrying legacy form: {}",
                preferred.chars().take(60).collect::<String>()
            );
            match g.run(query(legacy)).await {
                Ok(_) => Ok(()),
                Err(e) if is_already_exists(&e.to_string()) => Ok(()),
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

fn is_already_exists(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("already exists") || msg.contains("equivalent")
}

fn is_syntax_rejection(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("syntax") || msg.contains("invalid") || msg.contains("unsupported")
}
