//! idcanon - music person-name canonicalizer
//!
//! `idcanon scan` clusters the people names of a library (or a JSON names
//! file), prints the identity report and persists canonical mappings.
//! `idcanon resolve` looks names up against the persisted mappings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use idcanon::identity::{format_report, Canonicalizer, Category, DEFAULT_REPORT_LIMIT};
use idcanon::prescan::{collect_library_names, load_names_file, log_summary, scan_names};
use idcanon::resolver::{ExternalResolver, MusicBrainzResolver};
use idcanon_common::config::{load_toml_config, resolve_cache_path, resolve_config_path, TomlConfig};
use idcanon_common::{KeyValueCache, SqliteCache};

/// Command-line arguments for idcanon
#[derive(Parser, Debug)]
#[command(name = "idcanon")]
#[command(about = "Canonicalize artist, composer, conductor and performer names")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache database file
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster names and persist canonical mappings
    Scan {
        /// Library roots (override the config file)
        roots: Vec<PathBuf>,

        /// JSON file of names by category instead of a library walk
        #[arg(long)]
        names_file: Option<PathBuf>,

        /// Corroborate clusters with MusicBrainz
        #[arg(long)]
        musicbrainz: bool,

        /// Print the report without writing mappings
        #[arg(long)]
        no_persist: bool,

        /// Clusters shown per category
        #[arg(long, default_value_t = DEFAULT_REPORT_LIMIT)]
        report_limit: usize,
    },

    /// Print the canonical form of each NAME
    Resolve {
        /// artist, composer, album_artist, conductor or performer
        #[arg(short, long, default_value = "artist")]
        category: Category,

        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn log_filter(verbose: bool, configured_level: &str) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured_level))
    }
}

fn init_tracing(verbose: bool, configured_level: &str) {
    tracing_subscriber::registry()
        .with(log_filter(verbose, configured_level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load the TOML config under a subscriber scoped to the load
///
/// The global subscriber needs the configured level, so it is installed
/// afterwards.
fn load_config<W>(config_arg: Option<&Path>, verbose: bool, writer: W) -> Result<TomlConfig>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, "info"))
        .with_writer(writer)
        .finish();

    tracing::subscriber::with_default(bootstrap, || -> Result<TomlConfig> {
        let config = match resolve_config_path(config_arg) {
            Some(path) => load_toml_config(&path)?,
            None => TomlConfig::default(),
        };
        Ok(config)
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref(), args.verbose, std::io::stderr)?;

    init_tracing(args.verbose, &config.logging.level);

    let cache_path = resolve_cache_path(args.cache.as_deref(), &config);
    info!("Cache: {}", cache_path.display());
    let cache: Arc<dyn KeyValueCache> = Arc::new(
        SqliteCache::open(&cache_path)
            .await
            .context("Failed to open cache database")?,
    );

    match args.command {
        Command::Scan {
            roots,
            names_file,
            musicbrainz,
            no_persist,
            report_limit,
        } => {
            let names = match names_file {
                Some(path) => load_names_file(&path)?,
                None => {
                    let roots = if roots.is_empty() {
                        config.library_roots.clone()
                    } else {
                        roots
                    };
                    if roots.is_empty() {
                        bail!("No library roots given and none configured");
                    }
                    collect_library_names(roots, config.include_extensions.clone()).await?
                }
            };

            let mut mb_config = config.musicbrainz.clone();
            mb_config.enabled |= musicbrainz;
            let resolver = if mb_config.enabled {
                Some(MusicBrainzResolver::new(&mb_config, Some(Arc::clone(&cache)))?)
            } else {
                None
            };

            let result = scan_names(
                &names,
                &mb_config,
                resolver.as_ref().map(|r| r as &dyn ExternalResolver),
            )
            .await;

            print!("{}", format_report(&result, report_limit));

            if !no_persist {
                let mappings = Canonicalizer::new(cache).persist(&result).await?;
                log_summary(&result, mappings);
                println!("Persisted {} canonical mappings", mappings);
            }
        }

        Command::Resolve { category, names } => {
            let canonicalizer = Canonicalizer::new(cache);
            for name in &names {
                println!("{}", canonicalizer.resolve_multi(name, category).await);
            }
        }
    }

    Ok(())
}
