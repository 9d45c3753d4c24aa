use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use claimpulse_classify::OpenRouterClassifier;
use claimpulse_common::{ClaimClassifier, Config};
use claimpulse_graph::{migrate::migrate, GraphClient};
use claimpulse_jobs::scheduler::Scheduler;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("claimpulse=info".parse()?))
        .init();

    info!("ClaimPulse jobs scheduler starting...");

    let config = Config::from_env();

    // Connect to Neo4j
    let client = GraphClient::from_config(&config).await?;

    // Run migrations (idempotent)
    migrate(&client).await?;

    // Classifier only when a key is configured; velocity and retention
    // run regardless.
    let classifier: Option<Box<dyn ClaimClassifier>> = if config.openrouter_api_key.is_empty() {
        info!("No OPENROUTER_API_KEY set, enrichment disabled");
        None
    } else {
        info!(model = config.classify_model.as_str(), "Enrichment enabled");
        Some(Box::new(OpenRouterClassifier::from_config(&config)))
    };

    let scheduler = Scheduler::new(client, config, classifier);
    scheduler.run().await
}
