//! Propaganda-technique aggregation: tallies technique occurrences across
//! trends in a timeframe, weighted by check volume — a viral claim's
//! techniques count more than a rarely-checked one's.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use neo4rs::query;
use tracing::info;

use crate::writer::format_datetime;
use crate::GraphClient;

/// Static reference data: technique key, display name, definition.
/// Keys match the labels attached to trends at record time.
pub const TECHNIQUE_DEFINITIONS: &[(&str, &str, &str)] = &[
    (
        "name_calling",
        "Name Calling",
        "Attaching a negative label to a person or idea to discredit it without examining the evidence.",
    ),
    (
        "glittering_generalities",
        "Glittering Generalities",
        "Vague, emotionally appealing virtue words that carry conviction without information.",
    ),
    (
        "transfer",
        "Transfer",
        "Projecting the authority or prestige of something respected onto something else to make it accepted.",
    ),
    (
        "testimonial",
        "Testimonial",
        "Having a respected or hated figure endorse or condemn an idea in place of evidence.",
    ),
    (
        "plain_folks",
        "Plain Folks",
        "Presenting a speaker or idea as 'of the people' to win trust.",
    ),
    (
        "card_stacking",
        "Card Stacking",
        "Selective presentation of facts to give the best or worst possible case.",
    ),
    (
        "bandwagon",
        "Bandwagon",
        "Claiming everyone else is doing or believing it, so you should too.",
    ),
    (
        "fear_appeal",
        "Appeal to Fear",
        "Building support by instilling anxiety or panic about the alternative.",
    ),
    (
        "loaded_language",
        "Loaded Language",
        "Words chosen for strong emotional implications rather than accuracy.",
    ),
    (
        "whataboutism",
        "Whataboutism",
        "Deflecting criticism by pointing to someone else's real or alleged offenses.",
    ),
    (
        "false_dilemma",
        "False Dilemma",
        "Presenting only two options when more exist.",
    ),
    (
        "cherry_picking",
        "Cherry Picking",
        "Citing individual cases that confirm a position while ignoring contradicting data.",
    ),
    (
        "scapegoating",
        "Scapegoating",
        "Blaming a person or group for a problem they did not cause.",
    ),
    (
        "strawman",
        "Straw Man",
        "Refuting a distorted version of an opponent's argument instead of the real one.",
    ),
];

/// One technique's tally in a heatmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechniqueCount {
    pub technique: String,
    /// Occurrences weighted by the carrying trend's check_count.
    pub weighted_count: u64,
    /// Number of distinct trends carrying the technique.
    pub trend_count: u64,
}

/// Aggregated propaganda picture for a timeframe.
#[derive(Debug, Clone)]
pub struct PropagandaHeatmap {
    pub total_trends: u64,
    pub trends_with_techniques: u64,
    pub percentage: f64,
    /// Top techniques by weighted count, at most ten.
    pub top_techniques: Vec<TechniqueCount>,
    /// category → technique → weighted count.
    pub category_breakdown: BTreeMap<String, BTreeMap<String, u64>>,
    /// The static (key, display name, definition) reference table.
    pub definitions: &'static [(&'static str, &'static str, &'static str)],
}

/// Input row for the pure tally: one trend's techniques, volume, category.
#[derive(Debug, Clone)]
pub(crate) struct TechniqueRow {
    pub techniques: Vec<String>,
    pub check_count: u32,
    pub category: String,
}

/// Build the heatmap for trends seen within the timeframe, optionally
/// restricted to one category.
pub async fn get_propaganda_heatmap(
    client: &GraphClient,
    timeframe_hours: i64,
    category: Option<&str>,
) -> Result<PropagandaHeatmap, neo4rs::Error> {
    let g = &client.graph;
    let cutoff = format_datetime(&(Utc::now() - Duration::hours(timeframe_hours)));
    let category_clause = if category.is_some() {
        "AND t.category = $category"
    } else {
        ""
    };

    // Total population in window (with or without techniques)
    let cypher = format!(
        "MATCH (t:Trend)
         WHERE t.last_seen >= $cutoff
           {category_clause}
         RETURN count(t) AS total"
    );
    let mut q = query(&cypher).param("cutoff", cutoff.as_str());
    if let Some(cat) = category {
        q = q.param("category", cat);
    }
    let mut stream = g.execute(q).await?;
    let total_trends = if let Some(row) = stream.next().await? {
        row.get::<i64>("total").unwrap_or(0) as u64
    } else {
        0
    };

    // Rows carrying at least one technique
    let cypher = format!(
        "MATCH (t:Trend)
         WHERE t.last_seen >= $cutoff
           AND size(t.propaganda_techniques) > 0
           {category_clause}
         RETURN t.propaganda_techniques AS techniques,
                t.check_count AS check_count,
                t.category AS category"
    );
    let mut q = query(&cypher).param("cutoff", cutoff.as_str());
    if let Some(cat) = category {
        q = q.param("category", cat);
    }

    let mut rows = Vec::new();
    let mut stream = g.execute(q).await?;
    while let Some(row) = stream.next().await? {
        rows.push(TechniqueRow {
            techniques: row.get("techniques").unwrap_or_default(),
            check_count: row.get::<i64>("check_count").unwrap_or(0) as u32,
            category: row.get("category").unwrap_or_default(),
        });
    }

    let heatmap = tally_techniques(total_trends, &rows);
    info!(
        total = heatmap.total_trends,
        with_techniques = heatmap.trends_with_techniques,
        "Propaganda heatmap built"
    );
    Ok(heatmap)
}

/// Pure tally over loaded rows.
pub(crate) fn tally_techniques(total_trends: u64, rows: &[TechniqueRow]) -> PropagandaHeatmap {
    let mut weighted: BTreeMap<String, u64> = BTreeMap::new();
    let mut trend_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut category_breakdown: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();

    for row in rows {
        let weight = row.check_count.max(1) as u64;
        for technique in &row.techniques {
            *weighted.entry(technique.clone()).or_default() += weight;
            *trend_counts.entry(technique.clone()).or_default() += 1;
            *category_breakdown
                .entry(row.category.clone())
                .or_default()
                .entry(technique.clone())
                .or_default() += weight;
        }
    }

    let mut top_techniques: Vec<TechniqueCount> = weighted
        .into_iter()
        .map(|(technique, weighted_count)| TechniqueCount {
            trend_count: trend_counts.get(&technique).copied().unwrap_or(0),
            technique,
            weighted_count,
        })
        .collect();
    top_techniques.sort_by(|a, b| {
        b.weighted_count
            .cmp(&a.weighted_count)
            .then_with(|| a.technique.cmp(&b.technique))
    });
    top_techniques.truncate(10);

    let trends_with_techniques = rows.len() as u64;
    let percentage = if total_trends > 0 {
        trends_with_techniques as f64 / total_trends as f64 * 100.0
    } else {
        0.0
    };

    PropagandaHeatmap {
        total_trends,
        trends_with_techniques,
        percentage,
        top_techniques,
        category_breakdown,
        definitions: TECHNIQUE_DEFINITIONS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(techniques: &[&str], check_count: u32, category: &str) -> TechniqueRow {
        TechniqueRow {
            techniques: techniques.iter().map(|s| s.to_string()).collect(),
            check_count,
            category: category.to_string(),
        }
    }

    #[test]
    fn empty_window_yields_empty_heatmap() {
        let heatmap = tally_techniques(0, &[]);
        assert_eq!(heatmap.total_trends, 0);
        assert_eq!(heatmap.trends_with_techniques, 0);
        assert_eq!(heatmap.percentage, 0.0);
        assert!(heatmap.top_techniques.is_empty());
        assert!(heatmap.category_breakdown.is_empty());
    }

    #[test]
    fn viral_trend_techniques_count_more() {
        // fear_appeal appears on one viral trend (100 checks),
        // bandwagon on three small trends (1 check each).
        let rows = vec![
            row(&["fear_appeal"], 100, "health"),
            row(&["bandwagon"], 1, "health"),
            row(&["bandwagon"], 1, "politics"),
            row(&["bandwagon"], 1, "politics"),
        ];
        let heatmap = tally_techniques(10, &rows);

        assert_eq!(heatmap.top_techniques[0].technique, "fear_appeal");
        assert_eq!(heatmap.top_techniques[0].weighted_count, 100);
        assert_eq!(heatmap.top_techniques[0].trend_count, 1);
        assert_eq!(heatmap.top_techniques[1].technique, "bandwagon");
        assert_eq!(heatmap.top_techniques[1].weighted_count, 3);
        assert_eq!(heatmap.top_techniques[1].trend_count, 3);
    }

    #[test]
    fn percentage_of_trends_with_techniques() {
        let rows = vec![
            row(&["loaded_language"], 5, ""),
            row(&["strawman", "cherry_picking"], 2, ""),
        ];
        let heatmap = tally_techniques(8, &rows);
        assert_eq!(heatmap.trends_with_techniques, 2);
        assert!((heatmap.percentage - 25.0).abs() < 1e-10);
    }

    #[test]
    fn category_breakdown_is_weighted_per_category() {
        let rows = vec![
            row(&["fear_appeal"], 10, "health"),
            row(&["fear_appeal"], 4, "politics"),
            row(&["bandwagon"], 2, "politics"),
        ];
        let heatmap = tally_techniques(3, &rows);

        assert_eq!(heatmap.category_breakdown["health"]["fear_appeal"], 10);
        assert_eq!(heatmap.category_breakdown["politics"]["fear_appeal"], 4);
        assert_eq!(heatmap.category_breakdown["politics"]["bandwagon"], 2);
    }

    #[test]
    fn top_techniques_capped_at_ten() {
        let names: Vec<String> = (0..15).map(|i| format!("technique_{i}")).collect();
        let rows: Vec<TechniqueRow> = names
            .iter()
            .enumerate()
            .map(|(i, n)| row(&[n.as_str()], (i + 1) as u32, ""))
            .collect();
        let heatmap = tally_techniques(15, &rows);
        assert_eq!(heatmap.top_techniques.len(), 10);
        // Highest weight first
        assert_eq!(heatmap.top_techniques[0].weighted_count, 15);
    }

    #[test]
    fn zero_check_count_still_weighs_one() {
        let rows = vec![row(&["transfer"], 0, "")];
        let heatmap = tally_techniques(1, &rows);
        assert_eq!(heatmap.top_techniques[0].weighted_count, 1);
    }

    #[test]
    fn definitions_table_has_unique_keys() {
        let mut keys: Vec<&str> = TECHNIQUE_DEFINITIONS.iter().map(|(k, _, _)| *k).collect();
        keys.sort();
        let len = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), len);
    }
}
