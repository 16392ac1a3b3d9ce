//! Library prescan: collect names, cluster them, persist the mappings

use crate::error::{Error, Result};
use crate::identity::{Canonicalizer, Category, IdentityScanner, NamesByCategory, ScanResult};
use crate::library::{LibraryScanner, TagReader};
use crate::resolver::ExternalResolver;
use idcanon_common::config::{MusicBrainzConfig, TomlConfig};
use idcanon_common::KeyValueCache;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Files between two progress log lines
const PROGRESS_LOG_INTERVAL: usize = 500;

/// Walk `roots` and read people tags from every audio file
///
/// Runs on the blocking pool; tag reading is synchronous file I/O.
pub async fn collect_library_names(
    roots: Vec<PathBuf>,
    include_extensions: Vec<String>,
) -> Result<NamesByCategory> {
    tokio::task::spawn_blocking(move || {
        let scanner = LibraryScanner::new(&include_extensions);
        scanner.collect_names(&roots, &TagReader::new(), |count, path| {
            debug!(file = %path.display(), "Scanned");
            if count % PROGRESS_LOG_INTERVAL == 0 {
                info!(files = count, "Library scan progress");
            }
        })
    })
    .await
    .map_err(|e| Error::Other(anyhow::anyhow!("Library scan task failed: {}", e)))
}

/// Read names from a JSON file shaped `{"artist": ["..."], ...}`
pub fn load_names_file(path: &Path) -> Result<NamesByCategory> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::InvalidInput(format!("{}: {}", path.display(), e)))
}

/// Cluster `names`, using `resolver` when given and available
pub async fn scan_names(
    names: &NamesByCategory,
    config: &MusicBrainzConfig,
    resolver: Option<&dyn ExternalResolver>,
) -> ScanResult {
    let scanner = IdentityScanner::from_config(config).with_progress(|category, count| {
        debug!(category = %category, names = count, "Scanning category");
    });

    match resolver {
        Some(resolver) => scanner.scan_with_resolver(names, resolver).await,
        None => scanner.scan(names),
    }
}

/// Full prescan of the configured library
///
/// Returns the scan result after its mappings were written to `cache`.
pub async fn run_prescan(
    config: &TomlConfig,
    cache: Arc<dyn KeyValueCache>,
    resolver: Option<&dyn ExternalResolver>,
) -> Result<ScanResult> {
    info!(roots = config.library_roots.len(), "Starting identity prescan");

    let names =
        collect_library_names(config.library_roots.clone(), config.include_extensions.clone())
            .await?;
    let result = scan_names(&names, &config.musicbrainz, resolver).await;

    let mappings = Canonicalizer::new(cache).persist(&result).await?;

    log_summary(&result, mappings);
    Ok(result)
}

/// Log files scanned and clusters per category
pub fn log_summary(result: &ScanResult, mappings: usize) {
    for category in Category::ALL {
        let clusters = result.clusters(category);
        if !clusters.is_empty() {
            info!(category = %category, clusters = clusters.len(), "Identity clusters");
        }
    }
    info!(
        files = result.items_scanned,
        clusters = result.total_clusters(),
        mappings,
        "Prescan complete"
    );
}
