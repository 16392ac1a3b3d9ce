//! idcanon library interface
//!
//! Resolves the many observed spellings of artist, composer, conductor and
//! performer names into canonical identities.
//!
//! - [`identity`]: tokenizer, splitter, matcher, canonical selection,
//!   cluster building/merging, the scanner and the runtime canonicalizer
//! - [`resolver`]: external identity lookup contract and MusicBrainz client
//! - [`library`]: audio-library walk and tag extraction feeding the scanner
//! - [`prescan`]: end-to-end library → clusters → cache driver

pub mod error;
pub mod identity;
pub mod library;
pub mod prescan;
pub mod resolver;

pub use crate::error::{Error, Result};
pub use crate::identity::{
    Canonicalizer, Category, IdentityCluster, IdentityKey, IdentityScanner, MatchOutcome,
    MatchStrategy, NamesByCategory, ScanResult,
};
pub use crate::resolver::{ExternalIdentityRecord, ExternalResolver};
