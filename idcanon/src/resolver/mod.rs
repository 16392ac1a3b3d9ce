//! External identity resolution
//!
//! An [`ExternalResolver`] maps a name to an authoritative identity record
//! (stable id, canonical name, aliases). The scanner depends only on this
//! trait; [`MusicBrainzResolver`] is the networked implementation.

mod musicbrainz;
mod throttle;

pub use musicbrainz::{MusicBrainzResolver, STRICT_MIN_SCORE};
pub use throttle::RequestThrottle;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// External resolver errors
///
/// Lookups never surface these to the scanner; they are logged and turned
/// into "no result".
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Artist not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Resolver disabled")]
    Disabled,
}

/// Authoritative identity returned by an external resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalIdentityRecord {
    /// Stable id (MusicBrainz artist MBID)
    pub external_id: String,
    pub canonical_name: String,
    /// Primary name first, then distinct aliases
    pub aliases: Vec<String>,
    /// Match confidence, 0.0 to 1.0
    pub confidence: f64,
    #[serde(default)]
    pub artist_type: Option<String>,
    #[serde(default)]
    pub sort_name: Option<String>,
    #[serde(default)]
    pub disambiguation: Option<String>,
}

impl ExternalIdentityRecord {
    /// Case-insensitive check against the canonical name and aliases
    pub fn has_alias(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.canonical_name.to_lowercase() == wanted
            || self.aliases.iter().any(|alias| alias.to_lowercase() == wanted)
    }
}

/// Name → identity record lookup
///
/// Implementations own their caching and rate limiting. Failures are
/// reported as `None`.
#[async_trait]
pub trait ExternalResolver: Send + Sync {
    /// Look up `name`; with `strict`, only high-confidence hits are returned
    async fn lookup(&self, name: &str, strict: bool) -> Option<ExternalIdentityRecord>;

    /// Whether lookups can be made at all
    fn is_available(&self) -> bool {
        true
    }
}
