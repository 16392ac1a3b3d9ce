//! Error types for idcanon
//!
//! The identity engine itself never fails; these cover the collaborators
//! around it (cache, resolver, library walk, CLI input).

use thiserror::Error;

/// idcanon result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the idcanon crate
#[derive(Debug, Error)]
pub enum Error {
    /// idcanon-common error (cache, config)
    #[error("Common error: {0}")]
    Common(#[from] idcanon_common::Error),

    /// External resolver error
    #[error("Resolver error: {0}")]
    Resolver(#[from] crate::resolver::ResolverError),

    /// Library walk error
    #[error("Library scan error: {0}")]
    LibraryScan(#[from] crate::library::ScanError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Names file or other JSON input could not be parsed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
