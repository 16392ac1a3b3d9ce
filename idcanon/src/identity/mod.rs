//! Identity clustering and canonicalization
//!
//! Data flows one way: raw strings → tokens/words → clusters → merged
//! clusters → (optionally) resolver-corroborated clusters → cache mappings.

pub mod builder;
pub mod canonicalizer;
pub mod external_merge;
pub mod matcher;
pub mod merger;
pub mod models;
pub mod report;
pub mod scanner;
pub mod selector;
pub mod splitter;
pub mod tokenizer;

pub use canonicalizer::{Canonicalizer, TrackPeople, MULTI_NAME_SEPARATOR};
pub use external_merge::ExternalMergeOptions;
pub use matcher::{match_names, MatchOutcome, MatchStrategy};
pub use models::{Category, IdentityCluster, IdentityKey, NamesByCategory, ScanResult};
pub use report::{format_report, DEFAULT_REPORT_LIMIT};
pub use scanner::IdentityScanner;
pub use selector::choose_canonical;
pub use splitter::split_names;
pub use tokenizer::{extract_initials, extract_words, normalize};
