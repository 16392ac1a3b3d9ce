//! Identity data model

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Role a name was observed in; clustering never crosses categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Artist,
    Composer,
    AlbumArtist,
    Conductor,
    #[serde(alias = "performers")]
    Performer,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Artist,
        Category::Composer,
        Category::AlbumArtist,
        Category::Conductor,
        Category::Performer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Artist => "artist",
            Category::Composer => "composer",
            Category::AlbumArtist => "album_artist",
            Category::Conductor => "conductor",
            Category::Performer => "performer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "artist" => Ok(Category::Artist),
            "composer" => Ok(Category::Composer),
            "album_artist" => Ok(Category::AlbumArtist),
            "conductor" => Ok(Category::Conductor),
            "performer" | "performers" => Ok(Category::Performer),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// Globally unique cluster identifier, displayed as `category::token`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub category: Category,
    pub token: String,
}

impl IdentityKey {
    pub fn new(category: Category, token: impl Into<String>) -> Self {
        Self {
            category,
            token: token.into(),
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.category, self.token)
    }
}

/// One inferred real-world person or ensemble
///
/// `occurrences` counts every contributing observation, so it can exceed the
/// number of distinct `variants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityCluster {
    /// Display form, chosen from (or derived from) `variants`
    pub canonical: String,
    pub identity_key: IdentityKey,
    pub variants: BTreeSet<String>,
    pub occurrences: usize,
}

impl IdentityCluster {
    pub fn token(&self) -> &str {
        &self.identity_key.token
    }

    pub fn category(&self) -> Category {
        self.identity_key.category
    }
}

/// Raw names grouped by category, in observation order
///
/// Duplicates are meaningful: each one adds to a cluster's occurrences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamesByCategory {
    #[serde(flatten)]
    pub names: BTreeMap<Category, Vec<String>>,
    /// Source items (audio files, ...) that contributed names
    #[serde(default)]
    pub items_scanned: usize,
}

impl NamesByCategory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Category, S)>,
        S: Into<String>,
    {
        let mut names = Self::new();
        for (category, raw) in pairs {
            names.push(category, raw);
        }
        names
    }

    pub fn push(&mut self, category: Category, raw: impl Into<String>) {
        self.names.entry(category).or_default().push(raw.into());
    }

    pub fn extend<I, S>(&mut self, category: Category, raws: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.names.entry(category).or_default();
        entry.extend(raws.into_iter().map(Into::into));
    }

    pub fn mark_item_scanned(&mut self) {
        self.items_scanned += 1;
    }

    pub fn get(&self, category: Category) -> &[String] {
        self.names.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total raw values across all categories
    pub fn len(&self) -> usize {
        self.names.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static NO_CLUSTERS: BTreeMap<String, IdentityCluster> = BTreeMap::new();

/// Clusters per category keyed by token, plus the number of items scanned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub categories: BTreeMap<Category, BTreeMap<String, IdentityCluster>>,
    pub items_scanned: usize,
}

impl ScanResult {
    /// Clusters of one category (empty when the category was not scanned)
    pub fn clusters(&self, category: Category) -> &BTreeMap<String, IdentityCluster> {
        self.categories.get(&category).unwrap_or(&NO_CLUSTERS)
    }

    pub fn total_clusters(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }

    /// Every cluster as (category, token, cluster)
    pub fn iter(&self) -> impl Iterator<Item = (Category, &str, &IdentityCluster)> {
        self.categories.iter().flat_map(|(category, clusters)| {
            clusters
                .iter()
                .map(move |(token, cluster)| (*category, token.as_str(), cluster))
        })
    }

    /// Cluster holding `raw` as one of its variants
    pub fn find_by_variant(&self, category: Category, raw: &str) -> Option<&IdentityCluster> {
        self.clusters(category)
            .values()
            .find(|cluster| cluster.variants.contains(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_strings_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert_eq!("performers".parse::<Category>(), Ok(Category::Performer));
        assert_eq!(" Composer ".parse::<Category>(), Ok(Category::Composer));
        assert!("producer".parse::<Category>().is_err());
    }

    #[test]
    fn test_identity_key_display() {
        let key = IdentityKey::new(Category::AlbumArtist, "milesdavis");
        assert_eq!(key.to_string(), "album_artist::milesdavis");
    }

    #[test]
    fn test_names_from_json() {
        let json = r#"{"artist": ["Miles Davis"], "performers": ["Yo-Yo Ma", "Yo-Yo Ma"]}"#;
        let names: NamesByCategory = serde_json::from_str(json).unwrap();
        assert_eq!(names.get(Category::Artist), ["Miles Davis"]);
        assert_eq!(names.get(Category::Performer).len(), 2);
        assert!(names.get(Category::Composer).is_empty());
        assert_eq!(names.items_scanned, 0);
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn test_names_push_and_extend() {
        let mut names = NamesByCategory::from_pairs([(Category::Composer, "Bach")]);
        names.push(Category::Composer, "J.S. Bach");
        names.extend(Category::Conductor, ["Karajan", "Solti"]);
        names.mark_item_scanned();

        assert_eq!(names.get(Category::Composer), ["Bach", "J.S. Bach"]);
        assert_eq!(names.get(Category::Conductor).len(), 2);
        assert_eq!(names.items_scanned, 1);
    }

    #[test]
    fn test_empty_scan_result() {
        let result = ScanResult::default();
        assert!(result.clusters(Category::Artist).is_empty());
        assert_eq!(result.total_clusters(), 0);
        assert_eq!(result.iter().count(), 0);
        assert!(result.find_by_variant(Category::Artist, "Miles Davis").is_none());
    }
}
