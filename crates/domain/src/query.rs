//! Query normalization — free spoken text to a canonical alias key.
//!
//! The deployed assistant speaks Russian, an inflected language: "свет на
//! кухне" and the catalog key "кухня" must meet in the middle. This is a
//! heuristic normalizer, not a stemmer: a fixed ordered list of leading
//! filler patterns is stripped, then a small set of trailing case endings,
//! each applied at most once. Targeting another working language means
//! replacing the pattern tables, not the algorithm shape.

use std::sync::LazyLock;

use regex::Regex;

/// Leading filler patterns, tried in order: a domain qualifier word
/// optionally followed by a preposition, or a bare preposition.
static LEADING_FILLERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^(свет|освещение|статус)\s+(на|в)\s+",
        r"^(температура|влажность|давление)\s+(в|на)\s+",
        r"^(свет|освещение|статус|температура|влажность|давление)\s*",
        r"^(на|в)\s+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("normalizer pattern is valid"))
    .collect()
});

/// Trailing case-inflection endings, stripped at most once each, in order.
const TRAILING_ENDINGS: [&str; 3] = ["е", "у", "ом"];

/// Normalize a free-text device/room query into a catalog alias key.
///
/// Pure and deterministic. Idempotent on already-normalized input: the
/// filler patterns are anchored at the start and the endings are checked
/// against the already-stripped form.
///
/// Single-pass by design: compound inflections may retain a residual
/// character, which the catalog keys account for.
#[must_use]
pub fn normalize(query: &str) -> String {
    let mut query = query.trim().to_lowercase();
    for pattern in LEADING_FILLERS.iter() {
        if let Some(range) = pattern.find(&query).map(|found| found.range()) {
            query.replace_range(range, "");
        }
    }
    for ending in TRAILING_ENDINGS {
        if let Some(stripped) = query.strip_suffix(ending) {
            query = stripped.to_string();
        }
    }
    query.trim().to_string()
}
