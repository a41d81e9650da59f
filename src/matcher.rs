// Intersection matcher - classifies match quality once per request
//
// The store guarantees that every returned cluster shares exactly
// `max_intersection` APs with the observed reading; this module only decides
// which side of the comparison must be trimmed before alignment.

/// How much of the stored data is usable, classified from the maximal
/// intersection size, the reading length and the configured key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchScope {
    /// Cluster key sets are smaller than the full key size, so their stored
    /// signal vectors are shorter than the canonical size.
    pub offline_partial: bool,
    /// The observed reading carries more APs than the intersection supports
    /// and must be restricted to each cluster's key set before alignment.
    pub online_partial: bool,
}

impl MatchScope {
    pub fn full() -> Self {
        MatchScope { offline_partial: false, online_partial: false }
    }
}

/// Classifies the match, or `None` when no cluster was found at all.
pub fn classify(max_intersection: usize, reading_len: usize, key_size: usize) -> Option<MatchScope> {
    if max_intersection == 0 {
        return None;
    }
    let offline_partial = max_intersection < key_size;
    // Only meaningful together with offline_partial: with a full-size key
    // set the intersection already covers the whole reading.
    let online_partial = offline_partial && max_intersection < reading_len;
    Some(MatchScope { offline_partial, online_partial })
}
