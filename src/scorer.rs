// Similarity scorer - squared signal distance per fingerprint
//
// Aligns the observed reading against each matched cluster's key-AP column
// order and scores every stored fingerprint by the sum of squared RSS
// differences. Candidates from all clusters are pooled into one list for the
// neighbour selection stage.

use nalgebra::DVector;
use tracing::trace;

use crate::fingerprint::{ApReading, MatchSet, ObservedReading, ScoredCandidate};
use crate::fix::FixError;
use crate::matcher::MatchScope;

/// Pooled scoring output across all candidate clusters.
#[derive(Debug)]
pub struct ScoredPool {
    /// Candidates in cluster order, then stored order within each cluster.
    pub candidates: Vec<ScoredCandidate>,
    /// Set when the single-cluster/single-fingerprint fast path skipped
    /// scoring entirely.
    pub fast_path: bool,
}

/// Scores every fingerprint of every matched cluster against the reading.
///
/// The stored column order is never modified in place: alignment builds a
/// fresh vector per fingerprint, so the `MatchSet` stays reusable.
pub fn score_clusters(
    reading: &ObservedReading,
    matches: &MatchSet,
    scope: MatchScope,
) -> Result<ScoredPool, FixError> {
    // Fast fix when the only matched cluster holds a single fingerprint.
    if matches.clusters.len() == 1 && matches.clusters[0].fingerprints.len() == 1 {
        return Ok(ScoredPool {
            candidates: vec![ScoredCandidate {
                record: matches.clusters[0].fingerprints[0].clone(),
                score: 0.0,
            }],
            fast_path: true,
        });
    }

    let mut candidates = Vec::new();
    for cluster in &matches.clusters {
        // Restrict the reading to this cluster's key set when the observed
        // set is wider than the intersection, preserving observed order.
        let aligned: Vec<&ApReading> = if scope.online_partial {
            reading
                .aps()
                .iter()
                .filter(|ap| cluster.key_aps.iter().any(|key| *key == ap.mac))
                .collect()
        } else {
            reading.aps().iter().collect()
        };

        // Column index of each aligned AP within the cluster's key set. The
        // intersection guarantees membership; a miss means the store broke
        // its contract.
        let mut columns = Vec::with_capacity(aligned.len());
        for ap in &aligned {
            let idx = cluster
                .key_aps
                .iter()
                .position(|key| *key == ap.mac)
                .ok_or_else(|| FixError::AlignmentInconsistency { mac: ap.mac.clone() })?;
            columns.push(idx);
        }

        let observed =
            DVector::from_iterator(aligned.len(), aligned.iter().map(|ap| ap.rss as f64));

        for fp in &cluster.fingerprints {
            // Reorder a copy of the stored vector into observed column order.
            let stored = DVector::from_iterator(columns.len(), columns.iter().map(|&c| fp.rss[c]));
            let score = (&observed - &stored).norm_squared();
            trace!(cluster = fp.cluster_id, spot = fp.spot_id, score, "scored fingerprint");
            candidates.push(ScoredCandidate { record: fp.clone(), score });
        }
    }

    Ok(ScoredPool { candidates, fast_path: false })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{ClusterMatch, FingerprintRecord};

    fn record(cluster_id: u32, spot_id: u32, rss: Vec<f64>) -> FingerprintRecord {
        FingerprintRecord {
            cluster_id,
            spot_id,
            latitude: 39.90,
            longitude: 116.39,
            rss,
        }
    }

    fn reading(raw: &[(&str, i32)]) -> ObservedReading {
        ObservedReading::from_scan(
            raw.iter().map(|(m, r)| (m.to_string(), *r)).collect(),
            4,
        )
    }

    #[test]
    fn test_fast_path_single_cluster_single_fingerprint() {
        let matches = MatchSet {
            max_intersection: 2,
            clusters: vec![ClusterMatch {
                key_aps: vec!["a".into(), "b".into()],
                fingerprints: vec![record(1, 1, vec![-60.0, -65.0])],
            }],
        };
        let pool =
            score_clusters(&reading(&[("a", -55), ("b", -60)]), &matches, MatchScope::full())
                .unwrap();
        assert!(pool.fast_path);
        assert_eq!(pool.candidates.len(), 1);
        assert_eq!(pool.candidates[0].score, 0.0);
    }

    #[test]
    fn test_squared_distance_in_key_column_order() {
        // Key set order differs from observed order; alignment must reorder.
        let matches = MatchSet {
            max_intersection: 2,
            clusters: vec![ClusterMatch {
                key_aps: vec!["b".into(), "a".into()],
                fingerprints: vec![
                    record(1, 1, vec![-61.0, -56.0]),
                    record(1, 2, vec![-85.0, -80.0]),
                ],
            }],
        };
        let pool =
            score_clusters(&reading(&[("a", -55), ("b", -60)]), &matches, MatchScope::full())
                .unwrap();
        assert!(!pool.fast_path);
        // (-55 - -56)^2 + (-60 - -61)^2 = 2
        assert!((pool.candidates[0].score - 2.0).abs() < 1e-9);
        // (-55 - -80)^2 + (-60 - -85)^2 = 1250
        assert!((pool.candidates[1].score - 1250.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_symmetric() {
        // Swapping observed and stored roles yields the same score.
        let matches = MatchSet {
            max_intersection: 2,
            clusters: vec![ClusterMatch {
                key_aps: vec!["a".into(), "b".into()],
                fingerprints: vec![
                    record(1, 1, vec![-55.0, -60.0]),
                    record(1, 2, vec![-70.0, -75.0]),
                ],
            }],
        };
        let forward =
            score_clusters(&reading(&[("a", -61), ("b", -66)]), &matches, MatchScope::full())
                .unwrap();

        let swapped = MatchSet {
            max_intersection: 2,
            clusters: vec![ClusterMatch {
                key_aps: vec!["a".into(), "b".into()],
                fingerprints: vec![
                    record(1, 1, vec![-61.0, -66.0]),
                    record(1, 2, vec![-61.0, -66.0]),
                ],
            }],
        };
        let reverse =
            score_clusters(&reading(&[("a", -55), ("b", -60)]), &swapped, MatchScope::full())
                .unwrap();
        assert!((forward.candidates[0].score - reverse.candidates[0].score).abs() < 1e-9);
        assert!(forward.candidates.iter().all(|c| c.score >= 0.0));
    }

    #[test]
    fn test_online_partial_restricts_reading() {
        // Reading has 3 APs but the cluster only knows 2 of them.
        let matches = MatchSet {
            max_intersection: 2,
            clusters: vec![ClusterMatch {
                key_aps: vec!["a".into(), "c".into()],
                fingerprints: vec![
                    record(1, 1, vec![-55.0, -65.0]),
                    record(1, 2, vec![-56.0, -66.0]),
                ],
            }],
        };
        let scope = MatchScope { offline_partial: true, online_partial: true };
        let pool =
            score_clusters(&reading(&[("a", -55), ("b", -60), ("c", -65)]), &matches, scope)
                .unwrap();
        // Exact match on the two shared columns; "b" never enters the score.
        assert_eq!(pool.candidates[0].score, 0.0);
    }

    #[test]
    fn test_alignment_inconsistency_is_fatal() {
        // Full-scope alignment against a key set missing an observed AP:
        // the store's intersection guarantee is broken.
        let matches = MatchSet {
            max_intersection: 2,
            clusters: vec![ClusterMatch {
                key_aps: vec!["a".into()],
                fingerprints: vec![record(1, 1, vec![-55.0]), record(1, 2, vec![-56.0])],
            }],
        };
        let err = score_clusters(&reading(&[("a", -55), ("b", -60)]), &matches, MatchScope::full())
            .unwrap_err();
        assert!(matches!(err, FixError::AlignmentInconsistency { .. }));
    }
}
