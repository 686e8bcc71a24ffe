//! Tiered service-name resolution
//!
//! Maps arbitrary collaborator text (icon metadata, OCR output, LLM
//! answers) to a canonical AWS service name with a confidence score.

use crate::canon::Canonicalizer;
use crate::similarity;
use crate::taxonomy::TaxonomyIndex;
use std::sync::Arc;
use tracing::debug;

/// Resolves free text to `(canonical_name, confidence)`.
///
/// Confidence semantics: `1.0` is reserved for exact alias-key hits;
/// fuzzy tiers return the similarity score scaled to `[0, 1]`; rejected
/// or unresolvable input comes back with `0.0`. Total over all inputs,
/// never panics.
pub struct ServiceNameResolver {
    taxonomy: Arc<TaxonomyIndex>,
    canonicalizer: Canonicalizer,
}

impl ServiceNameResolver {
    /// Resolver with the extended stopword set, which is what diagram
    /// labeling pipelines feed it (icon titles and product listings).
    pub fn new(taxonomy: Arc<TaxonomyIndex>) -> Self {
        Self::with_canonicalizer(taxonomy, Canonicalizer::extended())
    }

    pub fn with_canonicalizer(taxonomy: Arc<TaxonomyIndex>, canonicalizer: Canonicalizer) -> Self {
        Self {
            taxonomy,
            canonicalizer,
        }
    }

    pub fn taxonomy(&self) -> &TaxonomyIndex {
        &self.taxonomy
    }

    /// Resolve raw text to a canonical name and confidence.
    ///
    /// Tiers, first hit wins:
    /// 1. Empty input -> `("", 0.0)`
    /// 2. Canonicalized key is a registered alias key -> exact, `1.0`
    /// 3. Raw text lower-cased/trimmed is a registered alias key -> exact,
    ///    `1.0` (canonicalization can over-normalize, e.g. strip a token
    ///    that is load-bearing in the registered alias)
    /// 4. Fuzzy best match over alias keys -> `score / 100`
    /// 5. Fuzzy best match over canonical names -> `score / 100`
    /// 6. Canonicalized form contains a blacklisted substring -> `("", 0.0)`
    /// 7. Passthrough of the raw text with `0.0`
    pub fn resolve(&self, raw_text: &str) -> (String, f64) {
        if raw_text.trim().is_empty() {
            return (String::new(), 0.0);
        }

        let key = self.canonicalizer.canonicalize(raw_text);
        if let Some(canonical) = self.taxonomy.canonical_for_key(&key) {
            return (canonical.to_string(), 1.0);
        }

        let raw_key = raw_text.trim().to_lowercase();
        if let Some(canonical) = self.taxonomy.canonical_for_key(&raw_key) {
            return (canonical.to_string(), 1.0);
        }

        let alias_keys = self.taxonomy.alias_keys().iter().map(|k| k.as_str());
        if let Some((alias, score)) = similarity::best_match(&key, alias_keys) {
            if let Some(canonical) = self.taxonomy.canonical_for_key(alias) {
                debug!(
                    "Fuzzy alias match: '{}' -> '{}' via '{}' ({})",
                    raw_text, canonical, alias, score
                );
                return (canonical.to_string(), f64::from(score) / 100.0);
            }
        }

        let names = self.taxonomy.names().iter().map(|n| n.as_str());
        if let Some((name, score)) = similarity::best_match(&key, names) {
            debug!("Fuzzy name match: '{}' -> '{}' ({})", raw_text, name, score);
            return (name.to_string(), f64::from(score) / 100.0);
        }

        if self.taxonomy.is_blacklisted_key(&key) {
            return (String::new(), 0.0);
        }

        (raw_text.to_string(), 0.0)
    }

    /// Resolve a list of candidate labels and keep the best-scoring one.
    ///
    /// Returns `None` when every candidate resolves with zero confidence.
    /// Ties keep the earliest candidate.
    pub fn resolve_best<S: AsRef<str>>(&self, candidates: &[S]) -> Option<(String, f64)> {
        let mut best: Option<(String, f64)> = None;
        for candidate in candidates {
            let (label, score) = self.resolve(candidate.as_ref());
            if score > best.as_ref().map_or(0.0, |(_, s)| *s) {
                best = Some((label, score));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TaxonomyIndex;

    fn resolver() -> ServiceNameResolver {
        let csv = "\
canonical,aliases
Amazon S3,S3|Simple Storage Service
AWS Lambda,Lambda
Amazon EC2,EC2|Elastic Compute Cloud
AWS Service Catalog,
";
        let taxonomy = TaxonomyIndex::from_csv_str(csv, None).unwrap();
        ServiceNameResolver::new(Arc::new(taxonomy))
    }

    #[test]
    fn exact_alias_hits_score_one() {
        let r = resolver();
        for alias in ["S3", "s3", "Simple Storage Service", "Lambda", "amazon ec2"] {
            let (label, conf) = r.resolve(alias);
            assert_eq!(conf, 1.0, "alias '{}' resolved to ({}, {})", alias, label, conf);
        }
        assert_eq!(r.resolve("S3").0, "Amazon S3");
        assert_eq!(r.resolve("elastic compute cloud").0, "Amazon EC2");
    }

    #[test]
    fn vendor_prefix_variants_hit_exactly() {
        let r = resolver();
        // "amazon s3" canonicalizes to "s3", a registered key.
        assert_eq!(r.resolve("amazon s3"), ("Amazon S3".to_string(), 1.0));
        assert_eq!(r.resolve("AWS Lambda"), ("AWS Lambda".to_string(), 1.0));
    }

    #[test]
    fn raw_key_path_catches_over_normalized_aliases() {
        let r = resolver();
        // Canonicalization strips "aws " and "service", leaving "catalog",
        // which is not a registered key; the untouched raw key still is.
        let (label, conf) = r.resolve("AWS Service Catalog");
        assert_eq!(label, "AWS Service Catalog");
        assert_eq!(conf, 1.0);
    }

    #[test]
    fn fuzzy_match_scores_below_one() {
        let r = resolver();
        let (label, conf) = r.resolve("S3 bucket");
        assert_eq!(label, "Amazon S3");
        assert!(conf < 1.0, "fuzzy hit must not score 1.0, got {}", conf);
        assert!(conf > 0.5);
    }

    #[test]
    fn empty_input_resolves_to_nothing() {
        let r = resolver();
        assert_eq!(r.resolve(""), (String::new(), 0.0));
        assert_eq!(r.resolve("   "), (String::new(), 0.0));
    }

    #[test]
    fn total_over_arbitrary_input() {
        let r = resolver();
        for s in ["???", "(((", "\u{3042}\u{308a}", "a", "𝕊3", "  - _ / "] {
            let (_, conf) = r.resolve(s);
            assert!((0.0..=1.0).contains(&conf), "confidence {} for '{}'", conf, s);
        }
    }

    #[test]
    fn best_candidate_wins() {
        let r = resolver();
        let picked = r.resolve_best(&["random junk", "Amazon S3", "lambda"]).unwrap();
        assert_eq!(picked, ("Amazon S3".to_string(), 1.0));
    }

    #[test]
    fn no_candidates_above_zero_yields_none() {
        let r = resolver();
        assert!(r.resolve_best(&[""; 3]).is_none());
        assert!(r.resolve_best::<&str>(&[]).is_none());
    }
}
