//! Name matching strategies
//!
//! Strategies are tried in a fixed priority order and the first success wins:
//!
//! | Strategy           | Confidence | Condition                                   |
//! |--------------------|------------|---------------------------------------------|
//! | `exact`            | 1.00       | tokens identical                            |
//! | `substring`        | 0.85       | shorter token contained in the longer one   |
//! | `initial_exact`    | 0.95       | initials of the longer name + its surname   |
//! | `initial_wordwise` | 0.90       | word-by-word initials, equal word counts    |
//!
//! Fuzzy (edit distance, phonetic) matching is not implemented.

use super::tokenizer::{extract_initials, extract_words, normalize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy that produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Exact,
    Substring,
    InitialExact,
    InitialWordwise,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Substring => "substring",
            MatchStrategy::InitialExact => "initial_exact",
            MatchStrategy::InitialWordwise => "initial_wordwise",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            MatchStrategy::Exact => 1.0,
            MatchStrategy::Substring => 0.85,
            MatchStrategy::InitialExact => 0.95,
            MatchStrategy::InitialWordwise => 0.90,
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of comparing two names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub matches: bool,
    pub strategy: Option<MatchStrategy>,
    pub confidence: f64,
    /// Human-readable diagnostic
    pub details: String,
}

impl MatchOutcome {
    fn matched(strategy: MatchStrategy, details: String) -> Self {
        Self {
            matches: true,
            strategy: Some(strategy),
            confidence: strategy.confidence(),
            details,
        }
    }

    fn no_match(details: impl Into<String>) -> Self {
        Self {
            matches: false,
            strategy: None,
            confidence: 0.0,
            details: details.into(),
        }
    }
}

/// `word` stands for `full`: either a single-letter initial of it or equal to it
fn word_stands_for(word: &str, full: &str) -> bool {
    if word.len() == 1 {
        word.chars().next() == full.chars().next()
    } else {
        word == full
    }
}

/// Initials strategies, shared by [`match_names`] and the cluster merger
///
/// `short_token` is the token of the shorter name; the word lists come from
/// [`extract_words`]. Both names need at least two words.
pub fn match_initials<S: AsRef<str>>(
    short_token: &str,
    short_words: &[S],
    long_words: &[S],
) -> Option<MatchStrategy> {
    if short_words.len() < 2 || long_words.len() < 2 {
        return None;
    }

    // "js" + "bach" for ["johann", "sebastian", "bach"]
    let (last, leading) = long_words.split_last()?;
    let mut expected = extract_initials(leading);
    expected.push_str(last.as_ref());
    if short_token == expected {
        return Some(MatchStrategy::InitialExact);
    }

    if short_words.len() == long_words.len()
        && short_words
            .iter()
            .zip(long_words)
            .all(|(short, long)| word_stands_for(short.as_ref(), long.as_ref()))
    {
        return Some(MatchStrategy::InitialWordwise);
    }

    None
}

/// Decide whether two raw names denote the same identity
///
/// When the tokens have equal length, `name_a` is treated as the shorter name.
pub fn match_names(name_a: &str, name_b: &str) -> MatchOutcome {
    let token_a = normalize(name_a);
    let token_b = normalize(name_b);

    if token_a.is_empty() || token_b.is_empty() {
        return MatchOutcome::no_match("Empty token(s)");
    }

    if token_a == token_b {
        return MatchOutcome::matched(
            MatchStrategy::Exact,
            format!("Exact token match: '{}'", token_a),
        );
    }

    let ((short_token, short_name), (long_token, long_name)) = if token_a.len() <= token_b.len() {
        ((&token_a, name_a), (&token_b, name_b))
    } else {
        ((&token_b, name_b), (&token_a, name_a))
    };

    if long_token.contains(short_token.as_str()) {
        return MatchOutcome::matched(
            MatchStrategy::Substring,
            format!("'{}' is substring of '{}'", short_token, long_token),
        );
    }

    let short_words = extract_words(short_name);
    let long_words = extract_words(long_name);
    match match_initials(short_token, &short_words, &long_words) {
        Some(MatchStrategy::InitialExact) => MatchOutcome::matched(
            MatchStrategy::InitialExact,
            format!(
                "'{}' matches initials+surname pattern of '{}'",
                short_token, long_token
            ),
        ),
        Some(strategy) => MatchOutcome::matched(
            strategy,
            format!("Word-by-word initial match: {:?} vs {:?}", short_words, long_words),
        ),
        None => MatchOutcome::no_match("No matching strategy succeeded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact() {
        let outcome = match_names("Beethoven", "Beethoven");
        assert!(outcome.matches);
        assert_eq!(outcome.strategy, Some(MatchStrategy::Exact));
        assert_eq!(outcome.confidence, 1.0);

        let outcome = match_names("MILES DAVIS", "miles  davis.");
        assert_eq!(outcome.strategy, Some(MatchStrategy::Exact));
    }

    #[test]
    fn test_substring() {
        let outcome = match_names("Beethoven", "Ludwig van Beethoven");
        assert!(outcome.matches);
        assert_eq!(outcome.strategy, Some(MatchStrategy::Substring));
        assert_eq!(outcome.confidence, 0.85);

        // Argument order does not matter
        let outcome = match_names("Ludwig van Beethoven", "Beethoven");
        assert_eq!(outcome.strategy, Some(MatchStrategy::Substring));
    }

    #[test]
    fn test_initial_exact() {
        let outcome = match_names("J.S. Bach", "Johann Sebastian Bach");
        assert!(outcome.matches);
        assert_eq!(outcome.strategy, Some(MatchStrategy::InitialExact));
        assert!(outcome.confidence >= 0.90);

        let outcome = match_names("W.A. Mozart", "Wolfgang Amadeus Mozart");
        assert_eq!(outcome.strategy, Some(MatchStrategy::InitialExact));
    }

    #[test]
    fn test_initial_wordwise() {
        // Not "lv" + "beethoven", but each word stands for its partner
        let outcome = match_names("L. van Beethoven", "Ludwig van Beethoven");
        assert!(outcome.matches);
        assert_eq!(outcome.strategy, Some(MatchStrategy::InitialWordwise));
        assert_eq!(outcome.confidence, 0.90);
    }

    #[test]
    fn test_wordwise_requires_equal_word_counts() {
        // "J. Bach" has two words, "Johann Sebastian Bach" three
        let outcome = match_names("J. Bach", "Johann Sebastian Bach");
        assert!(!outcome.matches);
    }

    #[test]
    fn test_initials_need_two_words_each() {
        assert!(match_initials("bach", &["bach"], &["johann", "bach"]).is_none());
        assert_eq!(
            match_initials("jbach", &["j", "bach"], &["johann", "bach"]),
            Some(MatchStrategy::InitialExact)
        );
    }

    #[test]
    fn test_initials_of_non_ascii_words() {
        assert!(match_initials("x", &["a", "b"], &["zola", "émile"]).is_none());
        assert_eq!(
            match_initials("ézola", &["é", "zola"], &["émile", "zola"]),
            Some(MatchStrategy::InitialExact)
        );
    }

    #[test]
    fn test_no_match() {
        let outcome = match_names("Beethoven", "Mozart");
        assert!(!outcome.matches);
        assert_eq!(outcome.strategy, None);
        assert_eq!(outcome.confidence, 0.0);
    }

    #[test]
    fn test_empty_token_never_matches() {
        let outcome = match_names("", "Mozart");
        assert!(!outcome.matches);
        assert_eq!(outcome.details, "Empty token(s)");
        assert!(!match_names("???", "???").matches);
    }

    #[test]
    fn test_strategy_strings() {
        assert_eq!(MatchStrategy::InitialWordwise.to_string(), "initial_wordwise");
        let json = serde_json::to_string(&MatchStrategy::InitialExact).unwrap();
        assert_eq!(json, "\"initial_exact\"");
    }
}
