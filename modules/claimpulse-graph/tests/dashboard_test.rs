//! Integration tests for the dashboard read side: merged feed, category
//! breakdown, top domains, headline stats, propaganda heatmap. Requires a
//! Neo4j instance via CLAIMPULSE_TEST_NEO4J_URI; silently skipped otherwise.

use chrono::Utc;
use uuid::Uuid;

use claimpulse_common::{ClaimCheck, ClaimEnrichment, ScrapedSourceRecord};
use claimpulse_graph::{
    get_propaganda_heatmap, migrate::migrate, DashboardFeed, EntryOrigin, GraphClient,
    TrendReader, TrendWriter,
};

async fn test_client() -> Option<GraphClient> {
    let uri = std::env::var("CLAIMPULSE_TEST_NEO4J_URI").ok()?;
    let user = std::env::var("CLAIMPULSE_TEST_NEO4J_USER").unwrap_or_else(|_| "neo4j".to_string());
    let password =
        std::env::var("CLAIMPULSE_TEST_NEO4J_PASSWORD").unwrap_or_else(|_| "test".to_string());
    let client = GraphClient::connect(&uri, &user, &password).await.ok()?;
    migrate(&client).await.ok()?;
    Some(client)
}

fn check(claim: &str, score: f64, source_url: Option<&str>) -> ClaimCheck {
    ClaimCheck {
        claim_text: claim.to_string(),
        report_id: Uuid::new_v4().to_string(),
        credibility_score: score,
        source_url: source_url.map(str::to_string),
        input_type: Some("url".to_string()),
        propaganda_techniques: vec![],
    }
}

fn scraped(claim: &str, engagement: u32) -> ScrapedSourceRecord {
    ScrapedSourceRecord {
        id: Uuid::new_v4(),
        claim_text: claim.to_string(),
        rating: "Mostly False".to_string(),
        category: "politics".to_string(),
        source_url: "https://viral.example.net/post/1".to_string(),
        source_domain: "viral.example.net".to_string(),
        engagement_count: engagement,
        scraped_at: Utc::now(),
    }
}

#[tokio::test]
async fn feed_merges_trends_and_scraped_sources() {
    let Some(client) = test_client().await else { return };
    let writer = TrendWriter::new(client.clone());

    let marker = Uuid::new_v4().to_string();
    writer
        .record_claim(&check(&format!("internal claim {marker}"), 15.0, None))
        .await
        .unwrap();
    writer
        .ingest_scraped_source(&scraped(&format!("external claim {marker}"), 900))
        .await
        .unwrap();

    let feed = DashboardFeed::new(client);
    let page = feed.fetch(Some(&marker), 0, 50).await.unwrap();

    assert_eq!(page.total, 2);
    let origins: Vec<EntryOrigin> = page.entries.iter().map(|e| e.origin).collect();
    assert!(origins.contains(&EntryOrigin::Trend));
    assert!(origins.contains(&EntryOrigin::Scraped));

    // Internal rating derived from credibility; external passed through.
    for entry in &page.entries {
        match entry.origin {
            EntryOrigin::Trend => assert_eq!(entry.rating, "False"),
            EntryOrigin::Scraped => {
                assert_eq!(entry.rating, "Mostly False");
                assert!((entry.score - 90.0).abs() < 1e-9);
            }
        }
    }
}

#[tokio::test]
async fn feed_search_narrows_and_paginates() {
    let Some(client) = test_client().await else { return };
    let writer = TrendWriter::new(client.clone());

    let marker = Uuid::new_v4().to_string();
    for i in 0..3 {
        writer
            .record_claim(&check(&format!("page claim {i} {marker}"), 50.0, None))
            .await
            .unwrap();
    }

    let feed = DashboardFeed::new(client);
    let first = feed.fetch(Some(&marker), 0, 2).await.unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.entries.len(), 2);

    let second = feed.fetch(Some(&marker), 1, 2).await.unwrap();
    assert_eq!(second.total, 3);
    assert_eq!(second.entries.len(), 1);
}

#[tokio::test]
async fn feed_fetch_orders_by_velocity() {
    let Some(client) = test_client().await else { return };
    let writer = TrendWriter::new(client.clone());
    let reader = TrendReader::new(client.clone());

    let fast = writer
        .record_claim(&check(&format!("fast mover {}", Uuid::new_v4()), 50.0, None))
        .await
        .unwrap();
    let slow = writer
        .record_claim(&check(&format!("slow mover {}", Uuid::new_v4()), 50.0, None))
        .await
        .unwrap();

    // Force distinct velocities without waiting on snapshot history.
    for (hash, velocity) in [(&fast, 9.5), (&slow, 0.5)] {
        let q = neo4rs::query(
            "MATCH (t:Trend {claim_hash: $hash}) SET t.velocity_score = $velocity",
        )
        .param("hash", hash.as_str())
        .param("velocity", velocity);
        client.inner().run(q).await.unwrap();
    }

    let trends = reader.get_recent_by_velocity(100_000, 1).await.unwrap();
    let pos = |hash: &str| trends.iter().position(|t| t.claim_hash == hash);
    let fast_pos = pos(&fast).expect("fast trend missing from feed fetch");
    let slow_pos = pos(&slow).expect("slow trend missing from feed fetch");
    assert!(fast_pos < slow_pos, "feed fetch is not velocity-ordered");

    for pair in trends.windows(2) {
        assert!(pair[0].velocity_score >= pair[1].velocity_score);
    }
}

#[tokio::test]
async fn top_domains_count_instance_volume() {
    let Some(client) = test_client().await else { return };
    let writer = TrendWriter::new(client.clone());
    let reader = TrendReader::new(client);

    // A unique domain so other runs cannot collide on the count.
    let domain = format!("{}.example.com", Uuid::new_v4().simple());
    let url = format!("https://{domain}/article");
    for i in 0..3 {
        writer
            .record_claim(&check(
                &format!("domain claim {i} {}", Uuid::new_v4()),
                50.0,
                Some(&url),
            ))
            .await
            .unwrap();
    }

    let domains = reader.get_top_domains(10_000, 1).await.unwrap();
    let hit = domains
        .iter()
        .find(|d| d.domain == domain)
        .expect("expected domain missing from breakdown");
    assert_eq!(hit.instance_count, 3);
}

#[tokio::test]
async fn category_breakdown_groups_trends() {
    let Some(client) = test_client().await else { return };
    let writer = TrendWriter::new(client.clone());
    let reader = TrendReader::new(client);

    let category = format!("cat-{}", Uuid::new_v4().simple());
    let claim = format!("categorized breakdown claim {}", Uuid::new_v4());
    let hash = writer.record_claim(&check(&claim, 50.0, None)).await.unwrap();
    writer.record_claim(&check(&claim, 70.0, None)).await.unwrap();
    writer
        .set_enrichment(
            &hash,
            &ClaimEnrichment {
                category: category.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let breakdown = reader.get_category_breakdown(24).await.unwrap();
    let slice = breakdown
        .iter()
        .find(|c| c.category == category)
        .expect("expected category missing from breakdown");
    assert_eq!(slice.trend_count, 1);
    assert_eq!(slice.check_count, 2);
}

#[tokio::test]
async fn dashboard_stats_reflect_new_activity() {
    let Some(client) = test_client().await else { return };
    let writer = TrendWriter::new(client.clone());
    let reader = TrendReader::new(client);

    let before = reader.get_dashboard_stats().await.unwrap();
    writer
        .record_claim(&check(
            &format!("stats claim {}", Uuid::new_v4()),
            50.0,
            None,
        ))
        .await
        .unwrap();
    let after = reader.get_dashboard_stats().await.unwrap();

    assert!(after.total_trends >= before.total_trends + 1);
    assert!(after.total_checks >= before.total_checks + 1);
    assert!(after.active_last_24h >= 1);
    assert!(after.avg_credibility >= 0.0 && after.avg_credibility <= 100.0);
}

#[tokio::test]
async fn heatmap_tallies_techniques_in_a_category() {
    let Some(client) = test_client().await else { return };
    let writer = TrendWriter::new(client.clone());

    let category = format!("cat-{}", Uuid::new_v4().simple());
    let claim = format!("heatmap claim {}", Uuid::new_v4());
    let mut first = check(&claim, 20.0, None);
    first.propaganda_techniques = vec!["fear_appeal".to_string(), "bandwagon".to_string()];
    let hash = writer.record_claim(&first).await.unwrap();
    writer.record_claim(&check(&claim, 20.0, None)).await.unwrap();
    writer
        .set_enrichment(
            &hash,
            &ClaimEnrichment {
                category: category.clone(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let heatmap = get_propaganda_heatmap(&client, 24, Some(&category))
        .await
        .unwrap();
    assert_eq!(heatmap.total_trends, 1);
    assert_eq!(heatmap.trends_with_techniques, 1);
    assert!((heatmap.percentage - 100.0).abs() < 1e-9);

    // Both techniques weighted by the trend's two checks.
    for technique in ["fear_appeal", "bandwagon"] {
        let hit = heatmap
            .top_techniques
            .iter()
            .find(|t| t.technique == technique)
            .expect("technique missing from heatmap");
        assert_eq!(hit.weighted_count, 2);
        assert_eq!(hit.trend_count, 1);
    }
    assert_eq!(heatmap.category_breakdown[&category]["fear_appeal"], 2);
    assert!(!heatmap.definitions.is_empty());
}
