use neo4rs::{ConfigBuilder, Graph};

use claimpulse_common::Config;

/// Bolt connection handle shared by the writer, reader, and batch jobs.
/// Cheap to clone; the underlying driver pools connections.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect to the trend store with explicit credentials.
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, neo4rs::Error> {
        let driver_config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(10)
            .build()?;
        let graph = Graph::connect(driver_config).await?;
        Ok(Self { graph })
    }

    /// Connect using the Neo4j fields of the application config.
    pub async fn from_config(config: &Config) -> Result<Self, neo4rs::Error> {
        Self::connect(
            &config.neo4j_uri,
            &config.neo4j_user,
            &config.neo4j_password,
        )
        .await
    }

    /// Escape hatch to the underlying driver, for tests and migrations
    /// that need raw Cypher.
    pub fn inner(&self) -> &Graph {
        &self.graph
    }
}
