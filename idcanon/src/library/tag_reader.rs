//! People tags from audio files

use super::file_scanner::ScanError;
use crate::identity::Category;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};
use std::path::Path;

/// Free-form Vorbis comment fields naming performers
const PERFORMER_FIELDS: [&str; 3] = ["SOLOIST", "ORCHESTRA", "ENSEMBLE"];

/// Raw (unsplit) people values of a tag, by category
pub fn people_from_tag(tag: &Tag) -> Vec<(Category, String)> {
    let mapped = [
        (ItemKey::TrackArtist, Category::Artist),
        (ItemKey::AlbumArtist, Category::AlbumArtist),
        (ItemKey::Composer, Category::Composer),
        (ItemKey::Conductor, Category::Conductor),
        (ItemKey::Performer, Category::Performer),
    ];

    let mut people = Vec::new();
    for (key, category) in &mapped {
        people.extend(tag_values(tag, key).into_iter().map(|value| (*category, value)));
    }
    for field in PERFORMER_FIELDS {
        let key = ItemKey::Unknown(field.to_string());
        people.extend(tag_values(tag, &key).into_iter().map(|value| (Category::Performer, value)));
    }
    people
}

fn tag_values(tag: &Tag, key: &ItemKey) -> Vec<String> {
    tag.get_strings(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads people tags with lofty
#[derive(Debug, Clone, Default)]
pub struct TagReader;

impl TagReader {
    pub fn new() -> Self {
        Self
    }

    /// People values of the primary tag (or the first tag present)
    pub fn read(&self, path: &Path) -> Result<Vec<(Category, String)>, ScanError> {
        let tagged_file = Probe::open(path)
            .map_err(|e| ScanError::TagRead(path.to_path_buf(), e.to_string()))?
            .read()
            .map_err(|e| ScanError::TagRead(path.to_path_buf(), e.to_string()))?;

        let people = tagged_file
            .primary_tag()
            .or_else(|| tagged_file.first_tag())
            .map(people_from_tag)
            .unwrap_or_default();

        tracing::debug!(file = %path.display(), values = people.len(), "Read people tags");
        Ok(people)
    }
}
