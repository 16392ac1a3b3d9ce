//! Runtime canonicalization
//!
//! [`Canonicalizer::persist`] flattens a scan result into `category::token`
//! → canonical cache entries. The resolve methods look names up against
//! those entries and fall back to the input when nothing is known.

use super::models::{Category, IdentityKey, ScanResult};
use super::splitter::split_names;
use super::tokenizer::normalize;
use idcanon_common::KeyValueCache;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Output separator for multi-name values
pub const MULTI_NAME_SEPARATOR: &str = "; ";

/// People fields of one track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackPeople {
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub composer: Option<String>,
    pub conductor: Option<String>,
    #[serde(default)]
    pub performers: Vec<String>,
}

/// Cache-backed name canonicalizer with an in-process memo
pub struct Canonicalizer {
    cache: Arc<dyn KeyValueCache>,
    memo: RwLock<HashMap<String, String>>,
}

impl Canonicalizer {
    pub fn new(cache: Arc<dyn KeyValueCache>) -> Self {
        Self {
            cache,
            memo: RwLock::new(HashMap::new()),
        }
    }

    /// Write every cluster's mapping to the cache
    ///
    /// One entry per cluster key, plus one per variant whose own token
    /// differs from the cluster's. A variant token that is another cluster's
    /// key in the same category is skipped; that cluster's entry stands.
    /// Returns the number of entries written.
    /// Clears the memo so later lookups see the new mappings.
    pub async fn persist(&self, result: &ScanResult) -> idcanon_common::Result<usize> {
        let mut written = 0;

        for (category, token, cluster) in result.iter() {
            self.cache
                .set(&cluster.identity_key.to_string(), &cluster.canonical, None)
                .await?;
            written += 1;

            for variant in &cluster.variants {
                let variant_token = normalize(variant);
                if variant_token.is_empty()
                    || variant_token == token
                    || result.clusters(category).contains_key(&variant_token)
                {
                    continue;
                }
                let key = IdentityKey::new(category, variant_token);
                self.cache.set(&key.to_string(), &cluster.canonical, None).await?;
                written += 1;
            }
        }

        self.memo.write().await.clear();

        info!(
            mappings = written,
            clusters = result.total_clusters(),
            "Persisted canonical mappings"
        );
        Ok(written)
    }

    /// Canonical form of a single name, or the trimmed name when unknown
    pub async fn resolve(&self, name: &str, category: Category) -> String {
        let trimmed = name.trim();
        let token = normalize(trimmed);
        if token.is_empty() {
            return trimmed.to_string();
        }

        let key = IdentityKey::new(category, token).to_string();

        if let Some(canonical) = self.memo.read().await.get(&key) {
            return canonical.clone();
        }

        match self.cache.get(&key).await {
            Ok(Some(canonical)) if !canonical.is_empty() => {
                self.memo
                    .write()
                    .await
                    .insert(key, canonical.clone());
                canonical
            }
            Ok(_) => trimmed.to_string(),
            Err(e) => {
                warn!(key = %key, error = %e, "Canonical cache read failed");
                trimmed.to_string()
            }
        }
    }

    /// Canonicalize a possibly multi-name value
    ///
    /// Results are de-duplicated case-insensitively in first-seen order and
    /// joined with `"; "`. Returns `names` unchanged when nothing usable
    /// remains after splitting.
    pub async fn resolve_multi(&self, names: &str, category: Category) -> String {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for name in split_names(names) {
            let canonical = self.resolve(&name, category).await;
            if seen.insert(canonical.to_lowercase()) {
                resolved.push(canonical);
            }
        }

        if resolved.is_empty() {
            return names.to_string();
        }
        resolved.join(MULTI_NAME_SEPARATOR)
    }

    /// Canonicalize each entry of a list, dropping exact duplicates
    ///
    /// An empty outcome keeps the original list.
    pub async fn resolve_all(&self, names: &[String], category: Category) -> Vec<String> {
        let mut resolved: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let canonical = self.resolve(name, category).await;
            if !canonical.is_empty() && !resolved.contains(&canonical) {
                resolved.push(canonical);
            }
        }

        if resolved.is_empty() {
            return names.to_vec();
        }
        resolved
    }

    /// Rewrite a track's people fields to their canonical forms
    pub async fn canonicalize_track(&self, track: &mut TrackPeople) {
        let fields = [
            (&mut track.artist, Category::Artist),
            (&mut track.album_artist, Category::AlbumArtist),
            (&mut track.composer, Category::Composer),
            (&mut track.conductor, Category::Conductor),
        ];

        for (field, category) in fields {
            if let Some(value) = field.as_mut() {
                let canonical = self.resolve_multi(value, category).await;
                if canonical != *value {
                    debug!(category = %category, from = %value, to = %canonical, "Canonicalized");
                    *value = canonical;
                }
            }
        }

        if !track.performers.is_empty() {
            track.performers = self.resolve_all(&track.performers, Category::Performer).await;
        }
    }
}
