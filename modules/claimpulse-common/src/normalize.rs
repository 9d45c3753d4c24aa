//! Claim text canonicalization for deduplication.
//!
//! Purely lexical: two claims with different surface text but identical
//! normalized form map to the same trend. No semantic or fuzzy matching.

use sha2::{Digest, Sha256};

/// Canonicalize claim text: lowercase, strip everything that is not a
/// letter, digit, or whitespace, collapse runs of whitespace, trim.
pub fn normalize_claim(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stable content hash of normalized claim text. This is the trend's
/// identity: claims hashing equal are the same trend.
pub fn claim_hash(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract the host from a source URL, for per-domain aggregation.
pub fn source_domain(source_url: &str) -> Option<String> {
    url::Url::parse(source_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(
            normalize_claim("The Earth is FLAT!!!"),
            "the earth is flat"
        );
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(
            normalize_claim("  vaccines \t cause\n\n autism  "),
            "vaccines cause autism"
        );
    }

    #[test]
    fn punctuation_is_removed_not_spaced() {
        assert_eq!(normalize_claim("don't believe it"), "dont believe it");
        assert_eq!(normalize_claim("5G-towers spread covid"), "5gtowers spread covid");
    }

    #[test]
    fn surface_variants_normalize_identically() {
        let a = normalize_claim("The earth is flat.");
        let b = normalize_claim("  THE EARTH IS FLAT ");
        assert_eq!(a, b);
        assert_eq!(claim_hash(&a), claim_hash(&b));
    }

    #[test]
    fn distinct_claims_hash_differently() {
        let a = claim_hash(&normalize_claim("the earth is flat"));
        let b = claim_hash(&normalize_claim("the earth is round"));
        assert_ne!(a, b);
    }

    #[test]
    fn empty_claim_still_hashes() {
        let n = normalize_claim("  !?! ");
        assert_eq!(n, "");
        assert_eq!(claim_hash(&n).len(), 64);
    }

    #[test]
    fn unicode_text_survives_normalization() {
        assert_eq!(normalize_claim("Los OVNIs aterrizaron, ¡en serio!"), "los ovnis aterrizaron en serio");
    }

    #[test]
    fn source_domain_extracts_host() {
        assert_eq!(
            source_domain("https://example.com/fact-check/123?utm=x"),
            Some("example.com".to_string())
        );
        assert_eq!(source_domain("not a url"), None);
    }
}
