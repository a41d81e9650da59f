// Geodesy module - great-circle distance on a spherical Earth
//
// The error estimator only needs surface distances between nearby
// fingerprinted spots, so the spherical approximation is plenty.

use std::f64::consts::PI;

/// Degrees to radians conversion factor
const DTOR: f64 = PI / 180.0;

/// Average radius for spherical Earth approximation in meters
const SPHERICAL_R: f64 = 6371e3;

/// Returns great-circle distance in meters between two lat/lon points
///
/// **Assumes spherical Earth and ignores altitude**. Accuracy is ~1% for most purposes.
///
/// # Arguments
/// * `lat0`, `lon0` - First point (latitude, longitude) in degrees
/// * `lat1`, `lon1` - Second point (latitude, longitude) in degrees
///
/// # Returns
/// Distance in meters
pub fn greatcircle(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
    let lat0_rad = lat0 * DTOR;
    let lon0_rad = lon0 * DTOR;
    let lat1_rad = lat1 * DTOR;
    let lon1_rad = lon1 * DTOR;

    // Clamp: rounding can push the cosine fractionally above 1 for
    // near-identical points, and acos would return NaN.
    let c = lat0_rad.sin() * lat1_rad.sin()
        + lat0_rad.cos() * lat1_rad.cos() * (lon0_rad - lon1_rad).abs().cos();
    SPHERICAL_R * c.clamp(-1.0, 1.0).acos()
}
