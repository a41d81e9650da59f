// Fix pipeline - one store query, then match, score, select, estimate
//
// A pure function of the reading and the store snapshot: no shared state,
// no retries, no partial recovery. Either a complete fix comes out or a
// typed error does.

use tracing::{debug, info};

use crate::config::FixParams;
use crate::estimator;
use crate::fingerprint::{ObservedReading, PositionFix};
use crate::matcher;
use crate::scorer;
use crate::selector;
use crate::store::ClusterStore;

/// Estimation failures surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
    /// No cluster shares any AP with the observed reading; the caller must
    /// fall back to other positioning sources.
    #[error("no cluster matches the observed reading")]
    NoClusterFound,
    /// The store returned a cluster whose key set is missing an identifier
    /// that the intersection guarantees to be present. A store contract
    /// violation, not a recoverable condition.
    #[error("AP {mac} missing from a matched cluster's key set")]
    AlignmentInconsistency { mac: String },
}

/// Estimates a position fix for one observed reading.
///
/// Queries the store exactly once, classifies the match scope, scores every
/// candidate fingerprint, trims the pool to the dynamic nearest-neighbour
/// set and derives the weighted position plus error radius.
pub fn fix_position(
    reading: &ObservedReading,
    store: &dyn ClusterStore,
    params: &FixParams,
) -> Result<PositionFix, FixError> {
    let macs = reading.macs();
    let matches = store.best_clusters(&macs);

    let scope = matcher::classify(matches.max_intersection, reading.len(), params.cluster_key_size)
        .ok_or(FixError::NoClusterFound)?;
    debug!(
        max_intersection = matches.max_intersection,
        clusters = matches.clusters.len(),
        offline_partial = scope.offline_partial,
        online_partial = scope.online_partial,
        "matched clusters"
    );

    let pool = scorer::score_clusters(reading, &matches, scope)?;
    if pool.candidates.is_empty() {
        // Matched clusters without stored fingerprints cannot produce a fix;
        // surfacing them would end in a NaN weighted average.
        return Err(FixError::NoClusterFound);
    }
    let pool_len = pool.candidates.len();
    if pool.fast_path {
        debug!("single-cluster single-fingerprint fast path");
    }

    let neighborhood = selector::select(pool.candidates, params.knn, params.kwin);

    let (latitude, longitude) = estimator::estimate_position(&neighborhood, reading.len());
    let error_meters =
        estimator::estimate_error(latitude, longitude, &neighborhood, &matches, pool_len);

    info!(latitude, longitude, error_meters, "position fixed");
    Ok(PositionFix { latitude, longitude, error_meters })
}
