//! Service-name canonicalization
//!
//! Turns free-text AWS service names into deterministic comparison keys.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE_PARENS: Regex = Regex::new(r"\(.*?\)").unwrap();
    static ref RE_VENDOR_PREFIX: Regex = Regex::new(r"(?i)^(amazon|aws)\s+").unwrap();
    static ref RE_NON_ALNUM: Regex = Regex::new(r"[^0-9a-zA-Z]+").unwrap();
}

/// Words that carry no identity in a service name.
const BASE_STOP_WORDS: &[&str] = &["service", "services", "family"];

/// Additional noise words seen in marketing/product listings.
const PRODUCT_STOP_WORDS: &[&str] = &["product", "products"];

/// Canonicalizer for service-name strings.
///
/// Produces a normalized comparison key:
/// - Strips parenthesized substrings (including the parentheses)
/// - Strips one leading "Amazon " or "AWS " prefix (case-insensitive)
/// - Folds `&` to "and" and en/em dashes to ASCII hyphens
/// - Treats hyphen, underscore, and slash as word separators
/// - Drops stopword tokens, collapses whitespace, lowercases
///
/// The same input always yields the same output, and the output is a
/// fixed point: `canonicalize(canonicalize(s)) == canonicalize(s)`.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    stop_words: HashSet<String>,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Canonicalizer {
    /// Canonicalizer with the base stopword set.
    pub fn new() -> Self {
        Self {
            stop_words: BASE_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Canonicalizer with the extended stopword set used when input comes
    /// from product listings rather than icon metadata.
    pub fn extended() -> Self {
        let mut stop_words: HashSet<String> =
            BASE_STOP_WORDS.iter().map(|w| w.to_string()).collect();
        stop_words.extend(PRODUCT_STOP_WORDS.iter().map(|w| w.to_string()));
        Self { stop_words }
    }

    /// Normalize a service name into a comparison key.
    ///
    /// Empty or all-noise input yields an empty string; this never fails.
    pub fn canonicalize(&self, text: &str) -> String {
        let t = RE_PARENS.replace_all(text, "");
        let t = RE_VENDOR_PREFIX.replace(&t, "");
        let t = t.replace('&', "and").replace(['–', '—'], "-");
        let t = t.replace(['-', '_', '/'], " ");
        let tokens: Vec<&str> = t
            .split_whitespace()
            .filter(|w| !self.stop_words.contains(&w.to_lowercase()))
            .collect();
        tokens.join(" ").to_lowercase()
    }

    /// Split text into lowercase alphanumeric tokens.
    ///
    /// Unlike [`canonicalize`](Self::canonicalize) this keeps stopwords and
    /// is meant for token-level comparison, not key lookup.
    pub fn tokenize(text: &str) -> Vec<String> {
        let t = text.replace('&', "and");
        let t = RE_NON_ALNUM.replace_all(&t, " ");
        t.split_whitespace().map(|w| w.to_lowercase()).collect()
    }
}
