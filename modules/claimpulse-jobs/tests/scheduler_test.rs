//! Integration tests for the scheduler cycles. Requires a Neo4j instance
//! via CLAIMPULSE_TEST_NEO4J_URI; silently skipped otherwise.

use claimpulse_common::{ClaimPulseError, Config};
use claimpulse_graph::{migrate::migrate, GraphClient, TrendWriter};
use claimpulse_jobs::scheduler::{Scheduler, VELOCITY_LOCK};

async fn test_setup() -> Option<(GraphClient, Config)> {
    let uri = std::env::var("CLAIMPULSE_TEST_NEO4J_URI").ok()?;
    let user = std::env::var("CLAIMPULSE_TEST_NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string());
    let password =
        std::env::var("CLAIMPULSE_TEST_NEO4J_PASSWORD").unwrap_or_else(|_| "test".to_string());
    let client = GraphClient::connect(&uri, &user, &password).await.ok()?;
    migrate(&client).await.ok()?;

    let config = Config {
        neo4j_uri: uri,
        neo4j_user: user,
        neo4j_password: password,
        openrouter_api_key: String::new(),
        classify_model: "openai/gpt-4o-mini".to_string(),
        velocity_interval_minutes: 15,
        enrich_interval_minutes: 60,
        enrich_batch_limit: 20,
    };
    Some((client, config))
}

#[tokio::test]
async fn velocity_cycle_reports_a_held_lock_as_conflict() {
    let Some((client, config)) = test_setup().await else { return };
    let writer = TrendWriter::new(client.clone());
    let scheduler = Scheduler::new(client, config, None);

    assert!(writer.acquire_job_lock(VELOCITY_LOCK).await.unwrap());
    let err = scheduler.velocity_cycle().await.unwrap_err();
    assert!(matches!(err, ClaimPulseError::JobLockConflict));
    writer.release_job_lock(VELOCITY_LOCK).await.unwrap();

    // Lock free again: the cycle runs and releases behind itself.
    scheduler.velocity_cycle().await.unwrap();
    scheduler.velocity_cycle().await.unwrap();
}

#[tokio::test]
async fn enrich_cycle_without_classifier_is_a_noop() {
    let Some((client, config)) = test_setup().await else { return };
    let scheduler = Scheduler::new(client, config, None);
    scheduler.enrich_cycle().await.unwrap();
}

#[tokio::test]
async fn purge_cycle_runs_clean() {
    let Some((client, config)) = test_setup().await else { return };
    let scheduler = Scheduler::new(client, config, None);
    scheduler.purge_cycle().await.unwrap();
}
