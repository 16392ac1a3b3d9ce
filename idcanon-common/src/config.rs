//! Configuration loading and path resolution
//!
//! Resolution priority for every path setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "IDCANON_CONFIG";

/// Environment variable naming the cache database file
pub const CACHE_ENV_VAR: &str = "IDCANON_CACHE";

/// MusicBrainz asks clients to stay at or below one request per second
pub const MIN_REQUEST_INTERVAL_MS: u64 = 1000;

/// Default spacing between MusicBrainz requests
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 1100;

/// Compiled defaults used when nothing else is configured
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub cache_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let cache_path = dirs::data_local_dir()
            .map(|d| d.join("idcanon").join("cache.db"))
            .unwrap_or_else(|| PathBuf::from("./idcanon_data/cache.db"));

        let config_path = dirs::config_dir().map(|d| d.join("idcanon").join("config.toml"));

        Self {
            cache_path,
            config_path,
            log_level: "info".to_string(),
        }
    }
}

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[musicbrainz]` section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicBrainzConfig {
    /// Whether the external resolver pass runs during scans
    pub enabled: bool,
    pub base_url: String,
    pub user_agent: String,
    /// Minimum spacing between two API requests, in milliseconds
    pub min_interval_ms: u64,
    /// Require a search score of at least 90 before accepting a hit
    pub strict: bool,
    pub cache_ttl_days: u64,
    /// Resolver confidence at or above which the resolver's name replaces
    /// the algorithmic canonical form
    pub overwrite_confidence: f64,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://musicbrainz.org/ws/2".to_string(),
            user_agent: get_user_agent(),
            min_interval_ms: DEFAULT_REQUEST_INTERVAL_MS,
            strict: false,
            cache_ttl_days: 90,
            overwrite_confidence: 0.9,
        }
    }
}

impl MusicBrainzConfig {
    /// Request spacing, never below the one-per-second API policy
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms.max(MIN_REQUEST_INTERVAL_MS))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_days * 24 * 3600)
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Library folders scanned for audio files
    pub library_roots: Vec<PathBuf>,
    /// Lowercase file extensions (without dot) treated as audio files
    pub include_extensions: Vec<String>,
    pub cache_path: Option<PathBuf>,
    pub logging: LoggingConfig,
    pub musicbrainz: MusicBrainzConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            library_roots: Vec::new(),
            include_extensions: vec!["mp3".to_string(), "flac".to_string(), "m4a".to_string()],
            cache_path: None,
            logging: LoggingConfig::default(),
            musicbrainz: MusicBrainzConfig::default(),
        }
    }
}

/// Standard User-Agent for outgoing HTTP requests
pub fn get_user_agent() -> String {
    format!(
        "idcanon/{} ( https://github.com/idcanon/idcanon )",
        env!("CARGO_PKG_VERSION")
    )
}

/// Locate the TOML config file: CLI argument, then environment, then platform default
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    CompiledDefaults::for_current_platform().config_path
}

/// Load the TOML config file
///
/// A missing file yields defaults with a warning; a file that exists but does
/// not parse is a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Resolve the cache database path: CLI argument, environment, TOML, compiled default
pub fn resolve_cache_path(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CACHE_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.cache_path {
        return path.clone();
    }

    CompiledDefaults::for_current_platform().cache_path
}

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
