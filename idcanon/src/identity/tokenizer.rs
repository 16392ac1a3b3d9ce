//! Name tokenization
//!
//! Turns a raw name into a normalized clustering token and into the ordered
//! word list used by initial matching. All functions are pure.
//!
//! Examples:
//! - "Ludwig van Beethoven" → token "ludwigvanbeethoven"
//! - "Yo-Yo Ma" → token "yoyoma", words ["yo-yo", "ma"]
//! - "J.S. Bach" → token "jsbach", words ["j", "s", "bach"]

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Featuring-clause patterns, applied in order, each to every occurrence.
///
/// Each keyword must start at a word boundary and be followed by whitespace;
/// the clause runs to the closing parenthesis or the end of the string.
static FEATURING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\s*\(?\s*\bfeat\.?\s+[^)]+\)?",
        r"(?i)\s*\(?\s*\bfeaturing\s+[^)]+\)?",
        r"(?i)\s*\(?\s*\bft\.?\s+[^)]+\)?",
        r"(?i)\s*\(?\s*\bwith\s+[^)]+\)?",
    ]
    .iter()
    .filter_map(|pattern| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(pattern, error = %e, "Invalid featuring pattern");
            None
        }
    })
    .collect()
});

/// Remove "feat."/"featuring"/"ft."/"with" clauses
pub fn strip_featuring(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    for pattern in FEATURING_PATTERNS.iter() {
        if pattern.is_match(&cleaned) {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }
    }
    cleaned
}

/// Compatibility-decompose and drop everything outside ASCII
///
/// Diacritics decompose into combining marks which are then discarded, so
/// "Dvořák" becomes "Dvorak". Letters with no ASCII decomposition vanish.
pub fn ascii_fold(raw: &str) -> String {
    raw.nfkd().filter(char::is_ascii).collect()
}

/// Normalize a raw name into its clustering token
///
/// Returns an empty string when nothing usable remains; callers drop such
/// observations.
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let folded = ascii_fold(&strip_featuring(raw)).to_ascii_lowercase();

    // Runs of non-alphanumerics become single spaces, then spaces go away
    let spaced: String = folded
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();

    spaced.split_whitespace().collect()
}

/// Split a raw name into lowercase ASCII words
///
/// Splits on commas, periods and whitespace; featuring clauses are kept.
pub fn extract_words(raw: &str) -> Vec<String> {
    ascii_fold(raw)
        .to_ascii_lowercase()
        .split(|c: char| c == ',' || c == '.' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// First character of every word, lowercased
pub fn extract_initials<S: AsRef<str>>(words: &[S]) -> String {
    words
        .iter()
        .filter_map(|w| w.as_ref().chars().next())
        .flat_map(char::to_lowercase)
        .collect()
}
