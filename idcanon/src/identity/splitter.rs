//! Multi-name splitting
//!
//! A tag value such as "Miles Davis; John Coltrane" names several people,
//! while "Bach, J.S." names one person written last-name-first. The
//! splitter separates the former and leaves the latter intact.

use super::tokenizer::strip_featuring;

/// Values that never denote an identity
const RESERVED_NAMES: [&str; 4] = ["various", "various artists", "unknown", "n/a"];

/// Internal delimiter every multi-name separator is rewritten to
const DELIMITER: &str = ";";

/// Multi-name separators, rewritten in this order
const SEPARATORS: [&str; 4] = [" / ", "/", " & ", " and "];

/// True when the single comma in `raw` reads as "Last, First"
fn is_last_first(raw: &str) -> bool {
    if raw.matches(',').count() != 1 || raw.contains([';', '/', '&']) {
        return false;
    }

    raw.split_once(',')
        .map(|(_, rest)| rest.trim())
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| name.eq_ignore_ascii_case(reserved))
}

/// Split a raw tag value into individual cleaned names
///
/// Fragments are trimmed and stripped of featuring clauses; empty fragments
/// and placeholder values ("Various Artists", "Unknown", ...) are dropped.
pub fn split_names(raw: &str) -> Vec<String> {
    // "N/A" would otherwise split on its slash
    if is_reserved(raw.trim()) {
        return Vec::new();
    }

    let mut text = if is_last_first(raw) {
        raw.to_string()
    } else {
        raw.replace(',', DELIMITER)
    };

    for separator in SEPARATORS {
        text = text.replace(separator, DELIMITER);
    }

    text.split(DELIMITER)
        .map(|fragment| strip_featuring(fragment.trim()).trim().to_string())
        .filter(|name| !name.is_empty() && !is_reserved(name))
        .collect()
}
