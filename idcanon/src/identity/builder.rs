//! Initial cluster construction
//!
//! Splits every raw value into names, tokenizes them and groups names that
//! share a token into one cluster.

use super::models::{Category, IdentityCluster, IdentityKey};
use super::selector::choose_canonical;
use super::splitter::split_names;
use super::tokenizer::normalize;
use std::collections::BTreeMap;

/// Clusters of one category keyed by token, plus the number of usable names
#[derive(Debug, Default)]
pub struct BuiltClusters {
    pub clusters: BTreeMap<String, IdentityCluster>,
    pub observations: usize,
}

/// Group raw values of one category by token
///
/// Names whose token is empty are dropped.
pub fn build_clusters<S: AsRef<str>>(category: Category, raws: &[S]) -> BuiltClusters {
    let mut by_token: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut observations = 0;

    for raw in raws {
        for name in split_names(raw.as_ref()) {
            let token = normalize(&name);
            if token.is_empty() {
                continue;
            }
            by_token.entry(token).or_default().push(name);
            observations += 1;
        }
    }

    let clusters = by_token
        .into_iter()
        .map(|(token, names)| {
            let cluster = IdentityCluster {
                canonical: choose_canonical(&names),
                identity_key: IdentityKey::new(category, token.clone()),
                occurrences: names.len(),
                variants: names.into_iter().collect(),
            };
            (token, cluster)
        })
        .collect();

    BuiltClusters {
        clusters,
        observations,
    }
}
