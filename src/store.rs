// Cluster store - radio map lookup by maximal key-AP intersection
//
// The fix pipeline only needs one query: given the observed MACs, return the
// clusters whose key-AP sets share the most identifiers with them. The
// in-memory store below backs the CLI; anything that can answer the same
// query (a database, a remote service) can stand in behind the trait.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::fingerprint::{ClusterMatch, FingerprintRecord, MatchSet};

/// Radio-map lookup used exactly once per position fix.
pub trait ClusterStore {
    /// Returns the maximal key-set intersection with `macs` and every
    /// cluster achieving it. `max_intersection == 0` means no match.
    fn best_clusters(&self, macs: &[&str]) -> MatchSet;
}

/// One fingerprinted spot inside a cluster, as stored in the radio map file.
#[derive(Debug, Clone, Deserialize)]
pub struct Spot {
    pub spot_id: u32,
    pub latitude: f64,
    pub longitude: f64,
    /// Aligned to the owning cluster's `key_aps`.
    pub rss: Vec<f64>,
}

/// A cluster of fingerprints sharing one key-AP set.
#[derive(Debug, Clone, Deserialize)]
pub struct Cluster {
    pub cluster_id: u32,
    pub key_aps: Vec<String>,
    pub spots: Vec<Spot>,
}

/// In-memory radio map.
#[derive(Debug, Default, Deserialize)]
pub struct MemoryStore {
    pub clusters: Vec<Cluster>,
}

/// Radio map loading failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read radio map: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed radio map: {0}")]
    Format(#[from] serde_json::Error),
    #[error("invalid radio map: {0}")]
    Invalid(String),
}

impl MemoryStore {
    pub fn new(clusters: Vec<Cluster>) -> Self {
        MemoryStore { clusters }
    }

    /// Loads a radio map from a JSON file:
    /// `{"clusters": [{"cluster_id": .., "key_aps": [..], "spots": [..]}]}`
    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses and validates a JSON radio map.
    ///
    /// The fix pipeline trusts the store's shape, so user-supplied maps are
    /// checked here: every cluster must hold at least one fingerprint and
    /// every RSS vector must be aligned to its cluster's key-AP list.
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        let store: MemoryStore = serde_json::from_str(raw)?;
        for cluster in &store.clusters {
            if cluster.spots.is_empty() {
                return Err(StoreError::Invalid(format!(
                    "cluster {} has no fingerprints",
                    cluster.cluster_id
                )));
            }
            for spot in &cluster.spots {
                if spot.rss.len() != cluster.key_aps.len() {
                    return Err(StoreError::Invalid(format!(
                        "cluster {} spot {}: {} RSS values for {} key APs",
                        cluster.cluster_id,
                        spot.spot_id,
                        spot.rss.len(),
                        cluster.key_aps.len()
                    )));
                }
            }
        }
        Ok(store)
    }
}

impl ClusterStore for MemoryStore {
    fn best_clusters(&self, macs: &[&str]) -> MatchSet {
        let mut best = 0usize;
        let mut winners: Vec<&Cluster> = Vec::new();

        for cluster in &self.clusters {
            let n = cluster
                .key_aps
                .iter()
                .filter(|key| macs.contains(&key.as_str()))
                .count();
            if n == 0 {
                continue;
            }
            if n > best {
                best = n;
                winners.clear();
            }
            if n == best {
                winners.push(cluster);
            }
        }

        MatchSet {
            max_intersection: best,
            clusters: winners
                .into_iter()
                .map(|c| ClusterMatch {
                    key_aps: c.key_aps.clone(),
                    fingerprints: c
                        .spots
                        .iter()
                        .map(|s| FingerprintRecord {
                            cluster_id: c.cluster_id,
                            spot_id: s.spot_id,
                            latitude: s.latitude,
                            longitude: s.longitude,
                            rss: s.rss.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}
