//! # idcanon Common Library
//!
//! Shared code for the idcanon crates including:
//! - Error types
//! - Configuration loading (TOML file, environment, platform defaults)
//! - Key-value cache contract and its in-memory / SQLite implementations

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{KeyValueCache, MemoryCache};
#[cfg(feature = "sqlite")]
pub use cache::SqliteCache;
pub use error::{Error, Result};
