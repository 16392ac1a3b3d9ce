//! Resolver-backed merge pass
//!
//! Clusters whose canonical forms resolve to the same external id are
//! folded together. High-confidence records then replace the canonical form
//! and contribute their aliases as variants.

use super::merger::{ClusterArena, ClusterId};
use super::models::{Category, IdentityCluster};
use crate::resolver::{ExternalIdentityRecord, ExternalResolver};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Options for [`merge_external`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalMergeOptions {
    /// Passed through to [`ExternalResolver::lookup`]
    pub strict: bool,
    /// Record confidence at or above which the record's name becomes canonical
    pub overwrite_confidence: f64,
}

impl Default for ExternalMergeOptions {
    fn default() -> Self {
        Self {
            strict: false,
            overwrite_confidence: 0.9,
        }
    }
}

struct ResolvedGroup {
    record: ExternalIdentityRecord,
    members: Vec<ClusterId>,
}

/// Look up every cluster and merge those sharing an external id
pub async fn merge_external(
    category: Category,
    clusters: BTreeMap<String, IdentityCluster>,
    resolver: &dyn ExternalResolver,
    options: ExternalMergeOptions,
) -> BTreeMap<String, IdentityCluster> {
    if clusters.is_empty() {
        return clusters;
    }

    info!(
        category = %category,
        clusters = clusters.len(),
        "Resolving clusters via external resolver"
    );

    let mut arena = ClusterArena::new(clusters);
    let mut groups: Vec<ResolvedGroup> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut unresolved = 0;

    for id in arena.live_ids() {
        let canonical = arena.get(id).canonical.clone();
        let Some(record) = resolver.lookup(&canonical, options.strict).await else {
            unresolved += 1;
            continue;
        };

        match group_index.get(&record.external_id) {
            Some(&index) => groups[index].members.push(id),
            None => {
                group_index.insert(record.external_id.clone(), groups.len());
                groups.push(ResolvedGroup {
                    record,
                    members: vec![id],
                });
            }
        }
    }

    let mut merge_count = 0;
    for group in &groups {
        let mut members = group.members.iter().copied();
        let Some(mut survivor) = members.next() else {
            continue;
        };

        for member in members {
            let (kept, absorbed) = arena.pick_survivor(survivor, member);
            info!(
                category = %category,
                external_id = %group.record.external_id,
                absorbed = arena.get(absorbed).token(),
                survivor = arena.get(kept).token(),
                "Merged clusters via external id"
            );
            arena.fold(kept, absorbed);
            survivor = kept;
            merge_count += 1;
        }

        apply_record(arena.get_mut(survivor), &group.record, options.overwrite_confidence);
    }

    info!(
        category = %category,
        groups = groups.len(),
        merged = merge_count,
        unresolved,
        "External resolution complete"
    );

    arena.into_clusters()
}

/// Adopt the record's name and aliases when it is confident enough
fn apply_record(cluster: &mut IdentityCluster, record: &ExternalIdentityRecord, floor: f64) {
    if record.confidence < floor || record.canonical_name.trim().is_empty() {
        return;
    }

    cluster.canonical = record.canonical_name.clone();
    cluster.variants.insert(record.canonical_name.clone());
    cluster.variants.extend(
        record
            .aliases
            .iter()
            .filter(|alias| !alias.trim().is_empty())
            .cloned(),
    );
}
