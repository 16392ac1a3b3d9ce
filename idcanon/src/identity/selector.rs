//! Canonical form selection
//!
//! Picks the display spelling for a cluster from its observed variants.
//! Each distinct spelling gets a [`SelectionKey`]; the lowest key wins.

use std::cmp::Reverse;
use std::collections::HashMap;

/// At least one cased character and no lowercase ones
fn is_all_upper(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        cased |= c.is_uppercase();
    }
    cased
}

/// At least one cased character and no uppercase ones
fn is_all_lower(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_uppercase() {
            return false;
        }
        cased |= c.is_lowercase();
    }
    cased
}

/// "J.S. Bach", "J S Bach": a period, or short words before the last one
fn looks_like_initials(name: &str) -> bool {
    if name.contains('.') {
        return true;
    }
    let words: Vec<&str> = name.split_whitespace().collect();
    words.len() > 1
        && words[..words.len() - 1]
            .iter()
            .all(|w| w.chars().count() <= 2)
}

fn has_full_word(name: &str) -> bool {
    name.split_whitespace().any(|w| w.chars().count() > 2)
}

/// Ascending sort key for one distinct spelling; fields compare in order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SelectionKey<'a> {
    /// Fully upper- or lowercase spellings lose to mixed case
    pub not_mixed_case: bool,
    pub frequency: Reverse<usize>,
    /// "Last, First" form
    pub last_first: bool,
    pub all_upper: bool,
    pub all_lower: bool,
    /// Initials spelling while a full spelling exists
    pub initials_penalty: bool,
    pub word_count: usize,
    pub char_count: usize,
    pub folded: String,
    pub raw: &'a str,
}

impl<'a> SelectionKey<'a> {
    fn new(name: &'a str, frequency: usize, prefer_full: bool) -> Self {
        let all_upper = is_all_upper(name);
        let all_lower = is_all_lower(name);
        Self {
            not_mixed_case: all_upper || all_lower,
            frequency: Reverse(frequency),
            last_first: name.contains(", "),
            all_upper,
            all_lower,
            initials_penalty: prefer_full && looks_like_initials(name),
            word_count: name.split_whitespace().count(),
            char_count: name.chars().count(),
            folded: name.to_lowercase(),
            raw: name,
        }
    }
}

/// Choose the canonical spelling among observed variants
///
/// Duplicates count towards frequency. Returns an empty string for no input.
/// A winning "Last, First" spelling is rewritten to "First Last" only when
/// that exact spelling was observed too.
pub fn choose_canonical<I, S>(variants: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let variants: Vec<S> = variants.into_iter().collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for variant in &variants {
        *counts.entry(variant.as_ref()).or_default() += 1;
    }

    let has_initials = counts.keys().any(|name| looks_like_initials(name));
    let has_full = counts.keys().any(|name| has_full_word(name));
    let prefer_full = has_initials && has_full;

    let Some(best) = counts
        .iter()
        .map(|(&name, &frequency)| SelectionKey::new(name, frequency, prefer_full))
        .min()
        .map(|key| key.raw)
    else {
        return String::new();
    };

    if let Some((last, first)) = best.split_once(", ") {
        let first_last = format!("{} {}", first, last);
        if counts.contains_key(first_last.as_str()) {
            return first_last;
        }
    }

    best.to_string()
}
