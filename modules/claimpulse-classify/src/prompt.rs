//! Prompt construction and response parsing for claim classification.

use anyhow::{Context, Result};

use claimpulse_common::ClaimEnrichment;

pub(crate) const SYSTEM_PROMPT: &str = "You are a claim classification engine for a \
misinformation monitoring system. Given one claim, respond with a single JSON object \
and nothing else. No prose, no markdown fences. Schema:\n\
{\n\
  \"category\": \"one of: health, politics, science, economy, technology, \
climate, conflict, celebrity, other\",\n\
  \"subcategory\": \"free-form refinement of the category, or empty string\",\n\
  \"entities\": [\"named people, organizations, places mentioned in the claim\"],\n\
  \"keywords\": [\"3-6 lowercase topical keywords\"],\n\
  \"sentiment\": \"one of: positive, negative, neutral\"\n\
}";

pub(crate) fn user_prompt(claim_text: &str) -> String {
    format!("Classify this claim:\n\n{claim_text}")
}

/// Strip markdown code fences some models wrap around JSON output.
fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parse the model's reply into an enrichment record. Missing fields
/// default to empty; non-JSON replies are an error.
pub(crate) fn parse_enrichment(response: &str) -> Result<ClaimEnrichment> {
    let body = strip_code_blocks(response);
    serde_json::from_str(body).with_context(|| format!("Unparseable classification: {body}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_reply() {
        let reply = r#"{
            "category": "health",
            "subcategory": "vaccines",
            "entities": ["WHO"],
            "keywords": ["vaccine", "microchip"],
            "sentiment": "negative"
        }"#;
        let enrichment = parse_enrichment(reply).unwrap();
        assert_eq!(enrichment.category, "health");
        assert_eq!(enrichment.subcategory, "vaccines");
        assert_eq!(enrichment.entities, vec!["WHO"]);
        assert_eq!(enrichment.keywords, vec!["vaccine", "microchip"]);
        assert_eq!(enrichment.sentiment, "negative");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let enrichment = parse_enrichment(r#"{"category": "politics"}"#).unwrap();
        assert_eq!(enrichment.category, "politics");
        assert!(enrichment.subcategory.is_empty());
        assert!(enrichment.entities.is_empty());
        assert!(enrichment.keywords.is_empty());
        assert!(enrichment.sentiment.is_empty());
    }

    #[test]
    fn tolerates_code_fences() {
        let reply = "```json\n{\"category\": \"science\"}\n```";
        let enrichment = parse_enrichment(reply).unwrap();
        assert_eq!(enrichment.category, "science");
    }

    #[test]
    fn rejects_prose_replies() {
        assert!(parse_enrichment("Sure! This claim is about health.").is_err());
    }
}
