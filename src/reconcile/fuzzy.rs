//! Name normalization and token-set similarity.

use std::collections::BTreeSet;

/// Generational suffixes dropped before comparing names.
const NAME_SUFFIXES: [&str; 5] = ["JR", "SR", "II", "III", "IV"];

/// Uppercases, keeps letters and spaces, and drops suffix tokens.
///
/// "Kenneth Walker III" → "KENNETH WALKER", "St. Brown" → "ST BROWN".
pub fn normalize_name(name: &str) -> String {
    let letters: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    letters
        .split_whitespace()
        .filter(|token| !NAME_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Edit-distance similarity on a 0–100 scale.
fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

fn join_parts(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

/// Token-set similarity on a 0–100 scale.
///
/// Both strings are split into sorted token sets. Shared tokens are
/// compared against each side's full token list, so a name that is a
/// subset of the other ("ALLEN" vs "JOSH ALLEN") scores 100. Empty input
/// on either side scores 0.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let shared: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let shared = shared.join(" ");
    let full_a = join_parts(&shared, &only_a.join(" "));
    let full_b = join_parts(&shared, &only_b.join(" "));

    let mut best = ratio(&full_a, &full_b);
    if !shared.is_empty() {
        best = best.max(ratio(&shared, &full_a)).max(ratio(&shared, &full_b));
    }
    best
}
