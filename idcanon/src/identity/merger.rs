//! Cluster merging
//!
//! Clusters of one category live in an arena indexed by [`ClusterId`]. A
//! merge folds the absorbed cluster into the survivor by value and retires
//! the absorbed slot, so no two live entries ever alias one cluster.
//!
//! Tokens are visited in (length, token) order, which makes the outcome
//! independent of the order names were observed in.

use super::matcher::{match_initials, MatchStrategy};
use super::models::{Category, IdentityCluster};
use super::selector::choose_canonical;
use super::tokenizer::extract_words;
use std::collections::BTreeMap;
use tracing::debug;

/// Index of a cluster slot in a [`ClusterArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterId(usize);

#[derive(Debug)]
struct Slot {
    cluster: IdentityCluster,
    retired: bool,
}

/// Clusters of one category, ordered by (token length, token)
#[derive(Debug)]
pub struct ClusterArena {
    slots: Vec<Slot>,
}

impl ClusterArena {
    pub fn new(clusters: BTreeMap<String, IdentityCluster>) -> Self {
        let mut clusters: Vec<IdentityCluster> = clusters.into_values().collect();
        clusters.sort_by(|a, b| {
            a.token()
                .len()
                .cmp(&b.token().len())
                .then_with(|| a.token().cmp(b.token()))
        });

        Self {
            slots: clusters
                .into_iter()
                .map(|cluster| Slot {
                    cluster,
                    retired: false,
                })
                .collect(),
        }
    }

    /// Live cluster ids in (token length, token) order
    pub fn live_ids(&self) -> Vec<ClusterId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !slot.retired)
            .map(|(index, _)| ClusterId(index))
            .collect()
    }

    pub fn is_live(&self, id: ClusterId) -> bool {
        !self.slots[id.0].retired
    }

    pub fn get(&self, id: ClusterId) -> &IdentityCluster {
        &self.slots[id.0].cluster
    }

    pub fn get_mut(&mut self, id: ClusterId) -> &mut IdentityCluster {
        &mut self.slots[id.0].cluster
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.retired).count()
    }

    /// Occurrence-based survivor: `first` wins ties
    pub fn pick_survivor(&self, first: ClusterId, second: ClusterId) -> (ClusterId, ClusterId) {
        if self.get(first).occurrences >= self.get(second).occurrences {
            (first, second)
        } else {
            (second, first)
        }
    }

    /// Fold `absorbed` into `survivor` and retire it
    ///
    /// Variants are unioned, occurrences summed and the canonical form is
    /// recomputed over the survivor's variant set.
    pub fn fold(&mut self, survivor: ClusterId, absorbed: ClusterId) {
        if survivor == absorbed || !self.is_live(absorbed) {
            return;
        }

        let absorbed_slot = &mut self.slots[absorbed.0];
        absorbed_slot.retired = true;
        let variants = std::mem::take(&mut absorbed_slot.cluster.variants);
        let occurrences = absorbed_slot.cluster.occurrences;

        let target = self.get_mut(survivor);
        target.variants.extend(variants);
        target.occurrences += occurrences;
        target.canonical = choose_canonical(&target.variants);
    }

    /// Surviving clusters keyed by token
    pub fn into_clusters(self) -> BTreeMap<String, IdentityCluster> {
        self.slots
            .into_iter()
            .filter(|slot| !slot.retired)
            .map(|slot| (slot.cluster.identity_key.token.clone(), slot.cluster))
            .collect()
    }
}

/// Merge clusters whose token contains a shorter cluster's token
///
/// Each short token takes part in at most one merge per pass.
pub fn merge_substring_pass(arena: &mut ClusterArena, category: Category) -> usize {
    let ids = arena.live_ids();
    let mut merges = 0;

    for (i, &short) in ids.iter().enumerate() {
        if !arena.is_live(short) {
            continue;
        }

        for &long in &ids[i + 1..] {
            if !arena.is_live(long) {
                continue;
            }
            if !arena.get(long).token().contains(arena.get(short).token()) {
                continue;
            }

            let (survivor, absorbed) = arena.pick_survivor(short, long);
            debug!(
                category = %category,
                strategy = %MatchStrategy::Substring,
                survivor = arena.get(survivor).token(),
                absorbed = arena.get(absorbed).token(),
                "Merging clusters"
            );
            arena.fold(survivor, absorbed);
            merges += 1;
            break;
        }
    }

    merges
}

/// Merge clusters whose canonical forms match by initials
///
/// Words come from each cluster's current canonical form, so a merge earlier
/// in the pass can enable later ones.
pub fn merge_initials_pass(arena: &mut ClusterArena, category: Category) -> usize {
    let ids = arena.live_ids();
    let mut merges = 0;

    for (i, &short) in ids.iter().enumerate() {
        for &long in &ids[i + 1..] {
            // An absorbed outer token has nothing left to match
            if !arena.is_live(short) {
                break;
            }
            if !arena.is_live(long) {
                continue;
            }

            let short_cluster = arena.get(short);
            let long_cluster = arena.get(long);
            let short_words = extract_words(&short_cluster.canonical);
            let long_words = extract_words(&long_cluster.canonical);

            let Some(strategy) = match_initials(short_cluster.token(), &short_words, &long_words)
            else {
                continue;
            };

            let (survivor, absorbed) = arena.pick_survivor(short, long);
            debug!(
                category = %category,
                strategy = %strategy,
                survivor = arena.get(survivor).token(),
                absorbed = arena.get(absorbed).token(),
                "Merging clusters"
            );
            arena.fold(survivor, absorbed);
            merges += 1;
        }
    }

    merges
}

/// Run the substring pass, then the initials pass
pub fn merge_clusters(
    category: Category,
    clusters: BTreeMap<String, IdentityCluster>,
) -> BTreeMap<String, IdentityCluster> {
    if clusters.len() < 2 {
        return clusters;
    }

    let mut arena = ClusterArena::new(clusters);
    let substring_merges = merge_substring_pass(&mut arena, category);
    let initial_merges = merge_initials_pass(&mut arena, category);

    debug!(
        category = %category,
        substring_merges,
        initial_merges,
        clusters = arena.live_count(),
        "Merge passes complete"
    );

    arena.into_clusters()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::builder::build_clusters;

    fn merged(category: Category, raws: &[&str]) -> BTreeMap<String, IdentityCluster> {
        merge_clusters(category, build_clusters(category, raws).clusters)
    }

    #[test]
    fn test_substring_merge_keeps_more_frequent() {
        let clusters = merged(
            Category::Composer,
            &["Beethoven", "Ludwig van Beethoven", "Ludwig van Beethoven"],
        );
        assert_eq!(clusters.len(), 1);

        let cluster = &clusters["ludwigvanbeethoven"];
        assert_eq!(cluster.occurrences, 3);
        assert_eq!(cluster.variants.len(), 2);
    }

    #[test]
    fn test_substring_tie_keeps_shorter_token() {
        let clusters = merged(
            Category::Composer,
            &["Beethoven", "Beethoven", "Ludwig van Beethoven", "Ludwig van Beethoven"],
        );
        assert_eq!(clusters.len(), 1);

        let cluster = &clusters["beethoven"];
        assert_eq!(cluster.occurrences, 4);
        assert_eq!(cluster.canonical, "Beethoven");
    }

    #[test]
    fn test_one_substring_merge_per_short_token() {
        // "miles" is contained in both longer tokens but absorbs only the first
        let clusters = merged(Category::Artist, &["Miles", "Miles Davis", "Miles Kane"]);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters["miles"].occurrences, 2);
        assert!(clusters["miles"].variants.contains("Miles Kane"));
        assert!(clusters.contains_key("milesdavis"));
    }

    #[test]
    fn test_initials_merge() {
        let clusters = merged(
            Category::Composer,
            &[
                "J.S. Bach",
                "J.S. Bach",
                "J.S. Bach",
                "Johann Sebastian Bach",
                "Johann Sebastian Bach",
            ],
        );
        assert_eq!(clusters.len(), 1);

        let cluster = &clusters["jsbach"];
        assert_eq!(cluster.occurrences, 5);
        assert_eq!(cluster.canonical, "Johann Sebastian Bach");
    }

    #[test]
    fn test_absorbed_short_token_leaves_initials_pass() {
        // "jsbach" also fits "jakobsebastianusbach" but is absorbed before that pair
        let built = build_clusters(
            Category::Composer,
            &[
                "J.S. Bach",
                "Johann Sebastian Bach",
                "Johann Sebastian Bach",
                "Jakob Sebastianus Bach",
            ],
        );
        let mut arena = ClusterArena::new(built.clusters);

        assert_eq!(merge_substring_pass(&mut arena, Category::Composer), 0);
        assert_eq!(merge_initials_pass(&mut arena, Category::Composer), 1);

        let clusters = arena.into_clusters();
        assert_eq!(clusters.len(), 2);
        assert!(!clusters.contains_key("jsbach"));

        let survivor = &clusters["johannsebastianbach"];
        assert_eq!(survivor.occurrences, 3);
        assert!(survivor.variants.contains("J.S. Bach"));

        let untouched = &clusters["jakobsebastianusbach"];
        assert_eq!(untouched.occurrences, 1);
        assert_eq!(untouched.variants.len(), 1);
        assert!(!untouched.variants.contains("J.S. Bach"));
    }

    #[test]
    fn test_unrelated_clusters_untouched() {
        let clusters = merged(Category::Composer, &["Mozart", "Haydn", "Schubert"]);
        assert_eq!(clusters.len(), 3);
        assert!(clusters.values().all(|c| c.occurrences == 1));
    }

    #[test]
    fn test_fold_ignores_retired_and_self() {
        let built = build_clusters(Category::Artist, &["Miles", "Miles Davis"]);
        let mut arena = ClusterArena::new(built.clusters);
        let ids = arena.live_ids();

        arena.fold(ids[0], ids[0]);
        assert_eq!(arena.live_count(), 2);

        arena.fold(ids[0], ids[1]);
        arena.fold(ids[0], ids[1]);
        assert_eq!(arena.live_count(), 1);
        assert_eq!(arena.get(ids[0]).occurrences, 2);
    }

    #[test]
    fn test_arena_order_is_length_then_token() {
        let built = build_clusters(Category::Artist, &["Bbb", "Aaaa", "Aaa"]);
        let arena = ClusterArena::new(built.clusters);
        let tokens: Vec<&str> = arena
            .live_ids()
            .into_iter()
            .map(|id| arena.get(id).token())
            .collect();
        assert_eq!(tokens, vec!["aaa", "bbb", "aaaa"]);
    }
}
