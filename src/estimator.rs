// Position and error estimation over the selected neighbourhood
//
// The position is a weighted mean of the neighbourhood coordinates; weights
// combine the similarity score with a key-completeness penalty against the
// observed reading. The error radius comes from the dispersion of the
// contributing fingerprints, with fixed floors for degenerate cases.

use std::collections::HashSet;

use crate::constants::{ERR_FLOOR_M, ERR_SINGLE_AP_M};
use crate::fingerprint::{MatchSet, ScoredCandidate};
use crate::geodesy;

/// Weighted-average position over the neighbourhood.
///
/// The neighbourhood must be non-empty (the pipeline guarantees it after the
/// no-cluster check). A single member's coordinates are taken directly.
///
/// Weight derivation for the multi-member case:
/// * `ww[i] = |len(rss_i) - reading_len|`, the key-completeness mismatch
/// * every `ww` zero: uniform weight base of 1
/// * some zero: zeros replaced with `ww2 / (n * ww2)` where `ww2` is the
///   smallest nonzero mismatch, so complete candidates keep a small but
///   finite advantage
/// * `weight[i] = 1 / (ww[i] + score[i])`
pub fn estimate_position(neighborhood: &[ScoredCandidate], reading_len: usize) -> (f64, f64) {
    if neighborhood.len() == 1 {
        let record = &neighborhood[0].record;
        return (record.latitude, record.longitude);
    }

    let mut ww: Vec<f64> = neighborhood
        .iter()
        .map(|c| (c.record.rss.len() as f64 - reading_len as f64).abs())
        .collect();

    if ww.iter().all(|&w| w == 0.0) {
        // All candidates equally complete.
        for w in &mut ww {
            *w = 1.0;
        }
    } else if ww.iter().any(|&w| w == 0.0) {
        let ww2 = ww
            .iter()
            .copied()
            .filter(|&w| w > 0.0)
            .fold(f64::INFINITY, f64::min);
        let w_zero = ww2 / (ww.len() as f64 * ww2);
        for w in &mut ww {
            if *w == 0.0 {
                *w = w_zero;
            }
        }
    }

    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut weight_sum = 0.0;
    for (candidate, w) in neighborhood.iter().zip(&ww) {
        let weight = 1.0 / (w + candidate.score);
        lat_sum += weight * candidate.record.latitude;
        lon_sum += weight * candidate.record.longitude;
        weight_sum += weight;
    }
    (lat_sum / weight_sum, lon_sum / weight_sum)
}

/// Error radius for the fix, never below the 50 m floor.
///
/// * single pooled candidate: the dispersion of its own cluster's
///   fingerprints around the fix, `sum / (n - 1)`; a lone fingerprint falls
///   back to the fixed floor
/// * neighbourhood drawn from one distinct cluster: fixed floor, raised to
///   100 m when the match hinges on a single shared AP
/// * otherwise: mean great-circle distance from the fix to every
///   contributing fingerprint
pub fn estimate_error(
    latitude: f64,
    longitude: f64,
    neighborhood: &[ScoredCandidate],
    matches: &MatchSet,
    pool_len: usize,
) -> f64 {
    if pool_len == 1 {
        let record = &neighborhood[0].record;
        let home = matches
            .clusters
            .iter()
            .find(|c| c.fingerprints.iter().any(|f| f.cluster_id == record.cluster_id));
        if let Some(cluster) = home {
            let n = cluster.fingerprints.len();
            if n > 1 {
                let total: f64 = cluster
                    .fingerprints
                    .iter()
                    .map(|f| geodesy::greatcircle(latitude, longitude, f.latitude, f.longitude))
                    .sum();
                return (total / (n as f64 - 1.0)).max(ERR_FLOOR_M);
            }
        }
        return floor_for(matches.max_intersection);
    }

    let distinct: HashSet<u32> = neighborhood.iter().map(|c| c.record.cluster_id).collect();
    if distinct.len() == 1 {
        return floor_for(matches.max_intersection);
    }

    let mean = neighborhood
        .iter()
        .map(|c| geodesy::greatcircle(latitude, longitude, c.record.latitude, c.record.longitude))
        .sum::<f64>()
        / neighborhood.len() as f64;
    mean.max(ERR_FLOOR_M)
}

fn floor_for(max_intersection: usize) -> f64 {
    if max_intersection == 1 {
        ERR_SINGLE_AP_M
    } else {
        ERR_FLOOR_M
    }
}
