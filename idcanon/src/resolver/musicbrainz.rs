//! MusicBrainz artist resolver
//!
//! Lookup order for a name:
//! 1. Cache (`mb_artist:{name}`), never throttled
//! 2. `GET /artist?query=artist:"NAME"` search, best hit only
//! 3. `GET /artist/{id}?inc=aliases` for the alias list
//!
//! Both API requests wait for the shared [`RequestThrottle`] first.

use super::{ExternalIdentityRecord, ExternalResolver, RequestThrottle, ResolverError};
use async_trait::async_trait;
use idcanon_common::config::MusicBrainzConfig;
use idcanon_common::KeyValueCache;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Minimum search score accepted by strict lookups
pub const STRICT_MIN_SCORE: u32 = 90;

const CACHE_KEY_PREFIX: &str = "mb_artist:";

#[derive(Debug, Deserialize)]
struct ArtistSearchResponse {
    #[serde(default)]
    artists: Vec<ArtistSearchHit>,
}

#[derive(Debug, Deserialize)]
struct ArtistSearchHit {
    id: String,
    #[serde(default)]
    score: u32,
}

#[derive(Debug, Deserialize)]
struct MBArtist {
    id: String,
    name: String,
    #[serde(rename = "sort-name")]
    sort_name: Option<String>,
    #[serde(rename = "type")]
    artist_type: Option<String>,
    disambiguation: Option<String>,
    #[serde(default)]
    aliases: Vec<MBAlias>,
}

#[derive(Debug, Deserialize)]
struct MBAlias {
    name: String,
}

/// Primary name first, then each distinct alias
fn collect_aliases(artist: &MBArtist) -> Vec<String> {
    let mut aliases = vec![artist.name.clone()];
    for alias in &artist.aliases {
        if !alias.name.is_empty() && !aliases.contains(&alias.name) {
            aliases.push(alias.name.clone());
        }
    }
    aliases
}

fn cache_key(name: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, name.trim().to_lowercase())
}

/// Cached, throttled MusicBrainz lookups
pub struct MusicBrainzResolver {
    http_client: reqwest::Client,
    throttle: RequestThrottle,
    cache: Option<Arc<dyn KeyValueCache>>,
    base_url: String,
    cache_ttl: Duration,
    enabled: bool,
}

impl MusicBrainzResolver {
    pub fn new(
        config: &MusicBrainzConfig,
        cache: Option<Arc<dyn KeyValueCache>>,
    ) -> Result<Self, ResolverError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ResolverError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            throttle: RequestThrottle::new(config.min_interval()),
            cache,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache_ttl: config.cache_ttl(),
            enabled: config.enabled,
        })
    }

    async fn cached(&self, name: &str) -> Option<ExternalIdentityRecord> {
        let cache = self.cache.as_ref()?;
        match cache.get(&cache_key(name)).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(name = %name, error = %e, "Invalid cached MusicBrainz record");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(name = %name, error = %e, "MusicBrainz cache read failed");
                None
            }
        }
    }

    async fn store(&self, name: &str, record: &ExternalIdentityRecord) {
        let Some(cache) = &self.cache else {
            return;
        };

        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                warn!(name = %name, error = %e, "Failed to encode MusicBrainz record");
                return;
            }
        };

        if let Err(e) = cache.set(&cache_key(name), &json, Some(self.cache_ttl)).await {
            warn!(name = %name, error = %e, "MusicBrainz cache write failed");
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ResolverError> {
        self.throttle.wait().await;

        debug!(url = %url, "Querying MusicBrainz API");

        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ResolverError::Network(e.to_string()))?;

        let status = response.status();

        if status == 404 {
            return Err(ResolverError::NotFound(url.to_string()));
        }

        if status == 503 {
            return Err(ResolverError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResolverError::Api(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ResolverError::Parse(e.to_string()))
    }

    /// Search, then fetch the best hit with its aliases
    ///
    /// `Ok(None)` when a strict lookup only finds a low-score hit.
    async fn fetch(
        &self,
        name: &str,
        strict: bool,
    ) -> Result<Option<ExternalIdentityRecord>, ResolverError> {
        let search_url = format!("{}/artist", self.base_url);
        let query = format!("artist:\"{}\"", name.replace('"', "\\\""));
        let search: ArtistSearchResponse = self
            .get_json(&search_url, &[("query", query.as_str()), ("limit", "5"), ("fmt", "json")])
            .await?;

        let hit = search
            .artists
            .into_iter()
            .next()
            .ok_or_else(|| ResolverError::NotFound(name.to_string()))?;

        if strict && hit.score < STRICT_MIN_SCORE {
            debug!(name = %name, score = hit.score, "Low confidence MusicBrainz match");
            return Ok(None);
        }

        let artist_url = format!("{}/artist/{}", self.base_url, hit.id);
        let artist: MBArtist = self
            .get_json(&artist_url, &[("inc", "aliases"), ("fmt", "json")])
            .await?;

        Ok(Some(ExternalIdentityRecord {
            aliases: collect_aliases(&artist),
            external_id: artist.id,
            canonical_name: artist.name,
            confidence: f64::from(hit.score) / 100.0,
            artist_type: artist.artist_type,
            sort_name: artist.sort_name,
            disambiguation: artist.disambiguation.filter(|d| !d.is_empty()),
        }))
    }

    /// Look up several names, keeping each name that resolved
    pub async fn resolve_variants<F>(
        &self,
        names: &[String],
        mut progress: Option<F>,
    ) -> HashMap<String, ExternalIdentityRecord>
    where
        F: FnMut(usize, usize, &str),
    {
        let mut resolved = HashMap::new();
        for (index, name) in names.iter().enumerate() {
            if let Some(progress) = progress.as_mut() {
                progress(index + 1, names.len(), name);
            }
            if let Some(record) = self.lookup(name, false).await {
                resolved.insert(name.clone(), record);
            }
        }
        resolved
    }
}

#[async_trait]
impl ExternalResolver for MusicBrainzResolver {
    async fn lookup(&self, name: &str, strict: bool) -> Option<ExternalIdentityRecord> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        if !self.enabled {
            debug!(name = %name, error = %ResolverError::Disabled, "Skipping lookup");
            return None;
        }

        if let Some(record) = self.cached(name).await {
            debug!(name = %name, "MusicBrainz cache hit");
            let min_confidence = f64::from(STRICT_MIN_SCORE) / 100.0;
            return (!strict || record.confidence >= min_confidence).then_some(record);
        }

        match self.fetch(name, strict).await {
            Ok(Some(record)) => {
                info!(
                    name = %name,
                    canonical = %record.canonical_name,
                    aliases = record.aliases.len(),
                    confidence = record.confidence,
                    "Resolved artist via MusicBrainz"
                );
                self.store(name, &record).await;
                Some(record)
            }
            Ok(None) => None,
            Err(ResolverError::NotFound(_)) => {
                debug!(name = %name, "No MusicBrainz results");
                None
            }
            Err(e) => {
                warn!(name = %name, error = %e, "MusicBrainz lookup failed");
                None
            }
        }
    }

    fn is_available(&self) -> bool {
        self.enabled
    }
}
