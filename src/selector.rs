// Neighbour selector - K-nearest cutoff followed by a dynamic window
//
// Two-stage trim of the pooled candidates: a distinct-value KNN cutoff that
// keeps ties at the boundary, then a proximity window sized from the best
// score (DKNN). Both stages keep a prefix of the score-sorted pool, so
// DKNN ⊆ KNN ⊆ pool always holds.

use tracing::debug;

use crate::fingerprint::ScoredCandidate;

/// KNN stage: keep every candidate whose score is within the K-th smallest
/// *distinct* score (or the largest distinct score when fewer exist).
///
/// Returns the kept candidates sorted by ascending score; the sort is stable
/// so pooled order breaks ties.
pub fn knn_cutoff(mut pool: Vec<ScoredCandidate>, k: usize) -> Vec<ScoredCandidate> {
    if pool.len() <= 1 {
        return pool;
    }

    let mut distinct: Vec<f64> = pool.iter().map(|c| c.score).collect();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    let bound = distinct[distinct.len().min(k.max(1)) - 1];

    pool.sort_by(|a, b| a.score.total_cmp(&b.score));
    let cut = pool.iter().take_while(|c| c.score <= bound).count();
    pool.truncate(cut);
    pool
}

/// DKNN stage: keep the prefix of the score-sorted KNN set that fits inside
/// a window derived from the smallest score.
///
/// * best score `s0 > 0`: window = `s0 * kwin`
/// * `s0 == 0` with a positive runner-up: window = `kwin`, so an exact match
///   does not collapse the window to nothing
/// * all zero (or a lone exact match): window = `0`
pub fn dknn_window(mut knn: Vec<ScoredCandidate>, kwin: f64) -> Vec<ScoredCandidate> {
    if knn.len() <= 1 {
        return knn;
    }

    let s0 = knn[0].score;
    let window = if s0 > 0.0 {
        s0 * kwin
    } else if knn[1].score > 0.0 {
        kwin
    } else {
        0.0
    };

    let cut = knn.iter().take_while(|c| c.score <= window).count();
    knn.truncate(cut);
    knn
}

/// Runs both stages over the pooled candidates. A single-candidate pool
/// skips selection entirely.
pub fn select(pool: Vec<ScoredCandidate>, k: usize, kwin: f64) -> Vec<ScoredCandidate> {
    if pool.len() <= 1 {
        return pool;
    }
    let knn = knn_cutoff(pool, k);
    let dknn = dknn_window(knn, kwin);
    debug!(kept = dknn.len(), "neighbour selection");
    dknn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::FingerprintRecord;

    fn candidates(scores: &[f64]) -> Vec<ScoredCandidate> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| ScoredCandidate {
                record: FingerprintRecord {
                    cluster_id: 1,
                    spot_id: i as u32,
                    latitude: 39.90,
                    longitude: 116.39,
                    rss: vec![-60.0],
                },
                score,
            })
            .collect()
    }

    fn scores(set: &[ScoredCandidate]) -> Vec<f64> {
        set.iter().map(|c| c.score).collect()
    }

    #[test]
    fn test_knn_distinct_bound_keeps_ties() {
        // Distinct scores [1, 2, 3, 4, 9]; with k = 4 the bound is 4 and the
        // duplicate 2 stays in.
        let knn = knn_cutoff(candidates(&[9.0, 2.0, 4.0, 1.0, 2.0, 3.0]), 4);
        assert_eq!(scores(&knn), vec![1.0, 2.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_knn_fewer_distinct_than_k() {
        let knn = knn_cutoff(candidates(&[5.0, 3.0]), 4);
        assert_eq!(scores(&knn), vec![3.0, 5.0]);
    }

    #[test]
    fn test_dknn_window_scales_best_score() {
        // Window = 2 * 3 = 6: 8 falls out.
        let dknn = dknn_window(candidates(&[2.0, 5.0, 8.0]), 3.0);
        assert_eq!(scores(&dknn), vec![2.0, 5.0]);
    }

    #[test]
    fn test_dknn_exact_match_keeps_fixed_window() {
        // s0 = 0 with a positive runner-up: window = kwin itself.
        let dknn = dknn_window(candidates(&[0.0, 2.0, 7.0]), 3.0);
        assert_eq!(scores(&dknn), vec![0.0, 2.0]);
    }

    #[test]
    fn test_dknn_all_exact_matches() {
        // Zero window still keeps every zero-score candidate.
        let dknn = dknn_window(candidates(&[0.0, 0.0, 4.0]), 3.0);
        assert_eq!(scores(&dknn), vec![0.0, 0.0]);
    }

    #[test]
    fn test_selection_is_monotonically_shrinking() {
        let pool = candidates(&[7.0, 1.0, 3.0, 12.0, 3.0, 40.0]);
        let knn = knn_cutoff(pool.clone(), 3);
        let dknn = dknn_window(knn.clone(), 3.0);
        assert!(dknn.len() <= knn.len());
        assert!(knn.len() <= pool.len());
        // DKNN is a prefix of the sorted KNN set.
        assert_eq!(scores(&dknn), scores(&knn)[..dknn.len()].to_vec());
    }

    #[test]
    fn test_single_candidate_skips_selection() {
        let pool = candidates(&[99.0]);
        assert_eq!(scores(&select(pool, 4, 3.0)), vec![99.0]);
    }
}
