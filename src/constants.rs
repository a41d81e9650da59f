// Shared constants for the fingerprint positioning pipeline

/// Maximum number of key APs per cluster, and the maximum number of observed
/// APs kept from a scan (strongest first).
pub const CLUSTER_KEY_SIZE: usize = 4;

/// K for the first nearest-neighbour cutoff.
pub const KNN: usize = 4;

/// Multiplier for the dynamic nearest-neighbour proximity window.
pub const KWIN: f64 = 3.0;

/// Default floor for the reported error radius (m).
pub const ERR_FLOOR_M: f64 = 50.0;

/// Error radius when the match hinges on a single shared AP (m).
pub const ERR_SINGLE_AP_M: f64 = 100.0;
