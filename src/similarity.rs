//! Weighted-ratio string similarity
//!
//! Fuzzy scoring for service-name resolution. Scores are integers on
//! `[0, 100]`; tolerant of word reordering and partial token overlap.

use std::collections::HashSet;
use strsim::{jaro_winkler, normalized_levenshtein};

/// Weighted similarity ratio between two strings, on `[0, 100]`.
///
/// Takes the best of three views of the pair:
/// - Jaro-Winkler on the raw strings (character-level, prefix-weighted)
/// - Normalized Levenshtein on token-sorted forms, slightly discounted
///   (rewards the same words in a different order)
/// - Token-overlap ratio, discounted further (rewards shared words when
///   one side has extra ones)
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let full = jaro_winkler(a, b);
    let sorted = normalized_levenshtein(&sort_tokens(a), &sort_tokens(b)) * 0.95;
    let overlap = token_overlap(a, b) * 0.90;

    let score = full.max(sorted).max(overlap);
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Best-scoring candidate for `query`, or `None` if `candidates` is empty.
///
/// Ties keep the earliest candidate, so iteration order decides and the
/// result is deterministic for a fixed candidate sequence.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<(&'a str, u8)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, u8)> = None;
    for candidate in candidates {
        let score = weighted_ratio(query, candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_overlap(a: &str, b: &str) -> f64 {
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    shared as f64 / ta.len().max(tb.len()) as f64
}
