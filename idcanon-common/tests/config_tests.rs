//! Configuration loading and path resolution tests
//!
//! Tests that manipulate IDCANON_CONFIG or IDCANON_CACHE are marked with
//! #[serial] so they never run in parallel with each other.

use idcanon_common::config::{
    load_toml_config, resolve_cache_path, resolve_config_path, CompiledDefaults, LoggingConfig,
    MusicBrainzConfig, TomlConfig, CACHE_ENV_VAR, CONFIG_ENV_VAR,
};
use idcanon_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.cache_path.as_os_str().is_empty());
    assert!(defaults.cache_path.ends_with("cache.db"));
    assert_eq!(defaults.log_level, "info");
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_toml_config(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.include_extensions, vec!["mp3", "flac", "m4a"]);
    assert!(!config.musicbrainz.enabled);
}

#[test]
fn test_malformed_config_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "library_roots = [unterminated").unwrap();

    let result = load_toml_config(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_partial_config_keeps_defaults_for_missing_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        library_roots = ["/music/classical"]

        [musicbrainz]
        enabled = true
        strict = true
        "#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();

    assert_eq!(config.library_roots, vec![PathBuf::from("/music/classical")]);
    assert!(config.musicbrainz.enabled);
    assert!(config.musicbrainz.strict);
    assert_eq!(config.musicbrainz.min_interval_ms, 1100);
    assert_eq!(config.musicbrainz.cache_ttl_days, 90);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_toml_roundtrip() {
    let config = TomlConfig {
        library_roots: vec![PathBuf::from("/music")],
        include_extensions: vec!["flac".to_string()],
        cache_path: Some(PathBuf::from("/var/cache/idcanon.db")),
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        musicbrainz: MusicBrainzConfig {
            enabled: true,
            ..Default::default()
        },
    };

    let toml_str = toml::to_string(&config).unwrap();
    let parsed: TomlConfig = toml::from_str(&toml_str).unwrap();

    assert_eq!(parsed, config);
}

#[test]
#[serial]
fn test_config_path_cli_beats_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/idcanon-env.toml");

    let resolved = resolve_config_path(Some(Path::new("/tmp/idcanon-cli.toml")));
    assert_eq!(resolved, Some(PathBuf::from("/tmp/idcanon-cli.toml")));

    let resolved = resolve_config_path(None);
    assert_eq!(resolved, Some(PathBuf::from("/tmp/idcanon-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_cache_path_priority_order() {
    env::remove_var(CACHE_ENV_VAR);

    let toml_config = TomlConfig {
        cache_path: Some(PathBuf::from("/tmp/idcanon-toml.db")),
        ..Default::default()
    };

    // Priority 1: CLI
    let path = resolve_cache_path(Some(Path::new("/tmp/idcanon-cli.db")), &toml_config);
    assert_eq!(path, PathBuf::from("/tmp/idcanon-cli.db"));

    // Priority 3: TOML (no env set)
    let path = resolve_cache_path(None, &toml_config);
    assert_eq!(path, PathBuf::from("/tmp/idcanon-toml.db"));

    // Priority 2: environment beats TOML
    env::set_var(CACHE_ENV_VAR, "/tmp/idcanon-env.db");
    let path = resolve_cache_path(None, &toml_config);
    assert_eq!(path, PathBuf::from("/tmp/idcanon-env.db"));
    env::remove_var(CACHE_ENV_VAR);

    // Priority 4: compiled default
    let path = resolve_cache_path(None, &TomlConfig::default());
    assert_eq!(path, CompiledDefaults::for_current_platform().cache_path);
}
