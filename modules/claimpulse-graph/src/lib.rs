pub mod client;
pub mod dashboard;
pub mod enrich;
pub mod migrate;
pub mod propaganda;
pub mod reader;
pub mod scoring;
pub mod velocity;
pub mod writer;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use client::GraphClient;
pub use dashboard::{DashboardEntry, DashboardFeed, DashboardPage, EntryOrigin};
pub use enrich::{enrich_uncategorized_trends, EnrichStats};
pub use propaganda::{get_propaganda_heatmap, PropagandaHeatmap, TechniqueCount};
pub use reader::{CategoryCount, DashboardStats, DomainCount, TrendReader};
pub use scoring::{compute_velocity, VelocityConfig, VelocityReading};
pub use velocity::{batch_calculate_velocity, calculate_velocity, VelocityBatchStats};
pub use writer::{PurgeStats, TrendWriter};
