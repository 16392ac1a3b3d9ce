//! Human-readable summary of multi-variant clusters

use super::models::{Category, IdentityCluster, ScanResult};
use std::fmt::Write;

/// Clusters shown per category unless told otherwise
pub const DEFAULT_REPORT_LIMIT: usize = 20;

/// Multi-variant clusters of one category, most frequent first
pub fn top_clusters(result: &ScanResult, category: Category, limit: usize) -> Vec<&IdentityCluster> {
    let mut clusters: Vec<&IdentityCluster> = result
        .clusters(category)
        .values()
        .filter(|cluster| cluster.variants.len() > 1)
        .collect();

    clusters.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.token().cmp(b.token()))
    });
    clusters.truncate(limit);
    clusters
}

/// Render the identity report
///
/// Categories without multi-variant clusters are omitted.
pub fn format_report(result: &ScanResult, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Identity scan: {} items, {} clusters",
        result.items_scanned,
        result.total_clusters()
    );

    for category in Category::ALL {
        let clusters = top_clusters(result, category, limit);
        if clusters.is_empty() {
            continue;
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "== {} ==", category);
        for cluster in clusters {
            let _ = writeln!(out, "{}", cluster.canonical);
            let _ = writeln!(out, "  Identity key: {}", cluster.identity_key);
            let _ = writeln!(out, "  Occurrences: {}", cluster.occurrences);
            let others: Vec<&str> = cluster
                .variants
                .iter()
                .map(String::as_str)
                .filter(|variant| *variant != cluster.canonical)
                .collect();
            if !others.is_empty() {
                let _ = writeln!(out, "  Variants: {}", others.join(" | "));
            }
        }
    }

    out
}
