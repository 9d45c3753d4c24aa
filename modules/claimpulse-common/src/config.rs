use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Classification (OpenRouter)
    pub openrouter_api_key: String,
    pub classify_model: String,

    // Scheduled jobs
    pub velocity_interval_minutes: u64,
    pub enrich_interval_minutes: u64,
    pub enrich_batch_limit: u32,
}

impl Config {
    /// Load configuration from environment variables. Panics with a clear
    /// message if required vars are missing. The OpenRouter key is
    /// optional: without it the enrichment pass is disabled, velocity and
    /// retention still run.
    pub fn from_env() -> Self {
        Self {
            neo4j_uri: required_env("NEO4J_URI"),
            neo4j_user: required_env("NEO4J_USER"),
            neo4j_password: required_env("NEO4J_PASSWORD"),
            openrouter_api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            classify_model: env::var("CLAIMPULSE_CLASSIFY_MODEL")
                .unwrap_or_else(|_| "openai/gpt-4o-mini".to_string()),
            velocity_interval_minutes: numeric_env("CLAIMPULSE_VELOCITY_INTERVAL_MINUTES", 15),
            enrich_interval_minutes: numeric_env("CLAIMPULSE_ENRICH_INTERVAL_MINUTES", 60),
            enrich_batch_limit: numeric_env("CLAIMPULSE_ENRICH_BATCH_LIMIT", 20) as u32,
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn numeric_env(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a number")),
        Err(_) => default,
    }
}
