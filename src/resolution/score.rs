//! Lexical overlap scoring between a pending item and an accomplished item.
//!
//! Jaccard similarity over normalized token sets. Scores only rank candidates;
//! a judge or the user confirms them.

use std::collections::BTreeSet;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it", "of",
    "on", "or", "so", "that", "the", "this", "to", "with",
];

/// Lowercased, stemmed content words of `text`.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOP_WORDS.contains(&t.as_str()))
        .map(|t| stem(&t))
        .collect()
}

/// Strip one common English inflection so "added"/"add" and "tests"/"test" meet.
fn stem(token: &str) -> String {
    const MIN_STEM: usize = 3;

    if let Some(stem) = token.strip_suffix("ing") {
        if stem.chars().count() >= MIN_STEM {
            return stem.to_string();
        }
    }
    if let Some(stem) = token.strip_suffix("ed") {
        if stem.chars().count() >= MIN_STEM {
            return stem.to_string();
        }
    }
    if let Some(stem) = token.strip_suffix("es") {
        let sibilant = ["x", "s", "z", "ch", "sh"].iter().any(|s| stem.ends_with(s));
        if sibilant && stem.chars().count() >= MIN_STEM {
            return stem.to_string();
        }
    }
    if let Some(stem) = token.strip_suffix('s') {
        if !stem.ends_with('s') && stem.chars().count() >= MIN_STEM {
            return stem.to_string();
        }
    }
    token.to_string()
}

/// Jaccard similarity of the two token sets, in `[0.0, 1.0]`. Symmetric.
pub fn overlap_score(a: &str, b: &str) -> f64 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    shared as f64 / union as f64
}
