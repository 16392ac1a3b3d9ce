//! Audio library walk
//!
//! Walks the configured library roots and feeds tag values from every audio
//! file into a [`NamesByCategory`].

use super::tag_reader::TagReader;
use crate::identity::NamesByCategory;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Library scan errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Tags could not be read from a file
    #[error("Tag read error {0}: {1}")]
    TagRead(PathBuf, String),
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Finds audio files by extension below library roots
#[derive(Debug, Clone)]
pub struct LibraryScanner {
    include_extensions: HashSet<String>,
}

impl LibraryScanner {
    /// `extensions` are matched case-insensitively, with or without a dot
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            include_extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    fn is_included(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.include_extensions.contains(&ext))
    }

    /// Audio files below `root`, sorted, hidden entries skipped
    pub fn find_files(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root.exists() {
            return Err(ScanError::PathNotFound(root.to_path_buf()));
        }

        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.is_included(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        tracing::debug!(root = %root.display(), files = files.len(), "Library root walked");
        Ok(files)
    }

    /// Read every audio file below `roots` into raw names
    ///
    /// Missing roots are skipped with a warning. Files whose tags cannot be
    /// read still count as scanned. `progress` gets the running file count.
    pub fn collect_names<F>(&self, roots: &[PathBuf], reader: &TagReader, mut progress: F) -> NamesByCategory
    where
        F: FnMut(usize, &Path),
    {
        let mut names = NamesByCategory::new();

        for root in roots {
            let files = match self.find_files(root) {
                Ok(files) => files,
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "Skipping library root");
                    continue;
                }
            };

            for path in files {
                match reader.read(&path) {
                    Ok(people) => {
                        for (category, value) in people {
                            names.push(category, value);
                        }
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Unreadable audio file");
                    }
                }
                names.mark_item_scanned();
                progress(names.items_scanned, &path);
            }
        }

        tracing::info!(
            files = names.items_scanned,
            names = names.len(),
            "Collected names from library"
        );
        names
    }
}
