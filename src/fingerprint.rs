// Radio map data model
//
// Every value here is immutable per-request data: a reading and a match set
// come in, scored candidates and a position fix go out. Nothing outlives a
// single estimation call and store-returned data is never mutated in place.

use std::collections::HashSet;

/// One observed access point: MAC identifier and received signal strength (dBm).
#[derive(Debug, Clone, PartialEq)]
pub struct ApReading {
    pub mac: String,
    pub rss: i32,
}

/// Ordered set of observed APs, strongest first.
///
/// Holds at most the cluster key size worth of APs; identifiers are unique
/// within the reading.
#[derive(Debug, Clone)]
pub struct ObservedReading {
    aps: Vec<ApReading>,
}

impl ObservedReading {
    /// Builds a reading from raw scan pairs.
    ///
    /// Sorts by descending signal strength (stable, so scan order breaks
    /// ties), keeps the strongest occurrence of a duplicated MAC and
    /// truncates to `max_aps`.
    pub fn from_scan(pairs: Vec<(String, i32)>, max_aps: usize) -> Self {
        let mut aps: Vec<ApReading> = pairs
            .into_iter()
            .map(|(mac, rss)| ApReading { mac, rss })
            .collect();
        aps.sort_by(|a, b| b.rss.cmp(&a.rss));

        let mut seen: HashSet<String> = HashSet::new();
        aps.retain(|ap| seen.insert(ap.mac.clone()));
        aps.truncate(max_aps);

        ObservedReading { aps }
    }

    pub fn len(&self) -> usize {
        self.aps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aps.is_empty()
    }

    pub fn aps(&self) -> &[ApReading] {
        &self.aps
    }

    /// Identifiers in reading order, for the store query.
    pub fn macs(&self) -> Vec<&str> {
        self.aps.iter().map(|ap| ap.mac.as_str()).collect()
    }
}

/// One fingerprinted spot from the radio map.
///
/// `rss` is positionally aligned to the owning cluster's key-AP list.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintRecord {
    pub cluster_id: u32,
    pub spot_id: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub rss: Vec<f64>,
}

/// A matched cluster: its key-AP list and the fingerprints stored under it.
///
/// The key-AP list defines the column order of every fingerprint's `rss`.
#[derive(Debug, Clone)]
pub struct ClusterMatch {
    pub key_aps: Vec<String>,
    pub fingerprints: Vec<FingerprintRecord>,
}

/// Result of the store query: the maximal key-set intersection with the
/// observed reading, and every cluster achieving it.
///
/// `max_intersection == 0` means no cluster shares any AP with the reading.
#[derive(Debug, Clone)]
pub struct MatchSet {
    pub max_intersection: usize,
    pub clusters: Vec<ClusterMatch>,
}

/// A fingerprint with its squared-distance similarity score (lower is better).
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub record: FingerprintRecord,
    pub score: f64,
}

/// Final output of one estimation: position plus error radius.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Never below the 50 m floor.
    pub error_meters: f64,
}
