//! Scan orchestration
//!
//! Per category: build clusters, run the substring and initials merge passes,
//! then optionally the resolver-backed pass. Categories never share state.

use super::builder::build_clusters;
use super::external_merge::{merge_external, ExternalMergeOptions};
use super::merger::merge_clusters;
use super::models::{Category, IdentityCluster, NamesByCategory, ScanResult};
use crate::resolver::ExternalResolver;
use idcanon_common::config::MusicBrainzConfig;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Progress sink called with (category, names processed so far)
pub type ScanProgress = Box<dyn Fn(Category, usize) + Send + Sync>;

/// Turns raw names into identity clusters
#[derive(Default)]
pub struct IdentityScanner {
    external: ExternalMergeOptions,
    progress: Option<ScanProgress>,
}

impl IdentityScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver options taken from the `[musicbrainz]` config section
    pub fn from_config(config: &MusicBrainzConfig) -> Self {
        Self::new()
            .with_strict(config.strict)
            .with_overwrite_confidence(config.overwrite_confidence)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.external.strict = strict;
        self
    }

    pub fn with_overwrite_confidence(mut self, confidence: f64) -> Self {
        self.external.overwrite_confidence = confidence;
        self
    }

    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(Category, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    fn report(&self, category: Category, count: usize) {
        if let Some(progress) = &self.progress {
            progress(category, count);
        }
    }

    /// Build and merge the clusters of one category
    fn cluster_category(&self, category: Category, raws: &[String]) -> BTreeMap<String, IdentityCluster> {
        self.report(category, 0);

        let built = build_clusters(category, raws);
        self.report(category, built.observations);

        debug!(
            category = %category,
            names = built.observations,
            clusters = built.clusters.len(),
            "Built initial clusters"
        );

        merge_clusters(category, built.clusters)
    }

    /// Cluster every category without external resolution
    pub fn scan(&self, names: &NamesByCategory) -> ScanResult {
        let mut result = ScanResult {
            items_scanned: names.items_scanned,
            ..Default::default()
        };

        for (&category, raws) in &names.names {
            let clusters = self.cluster_category(category, raws);
            result.categories.insert(category, clusters);
        }

        log_summary(&result);
        result
    }

    /// Cluster every category, then merge clusters the resolver identifies
    /// as the same entity
    ///
    /// An unavailable resolver makes this equivalent to [`Self::scan`].
    pub async fn scan_with_resolver(
        &self,
        names: &NamesByCategory,
        resolver: &dyn ExternalResolver,
    ) -> ScanResult {
        if !resolver.is_available() {
            debug!("External resolver unavailable, skipping resolver pass");
            return self.scan(names);
        }

        let mut result = ScanResult {
            items_scanned: names.items_scanned,
            ..Default::default()
        };

        for (&category, raws) in &names.names {
            let clusters = self.cluster_category(category, raws);
            let clusters = merge_external(category, clusters, resolver, self.external).await;
            result.categories.insert(category, clusters);
        }

        log_summary(&result);
        result
    }
}

fn log_summary(result: &ScanResult) {
    for (category, clusters) in &result.categories {
        debug!(category = %category, clusters = clusters.len(), "Category clustered");
    }
    info!(
        items_scanned = result.items_scanned,
        clusters = result.total_clusters(),
        "Identity scan complete"
    );
}
