//! Physical coordinates used for distance-based link costs.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used by [`Location::haversine_distance`].
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point in a 2-D coordinate plane (Euclidean) or in (latitude, longitude) degrees
/// (Haversine) — the caller picks which interpretation applies via the distance method used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance on a flat plane.
    pub fn euclidean_distance(&self, other: &Location) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Great-circle distance in meters, treating `x` as latitude and `y` as longitude (degrees).
    pub fn haversine_distance(&self, other: &Location) -> f64 {
        let (lat1, lon1) = (self.x.to_radians(), self.y.to_radians());
        let (lat2, lon2) = (other.x.to_radians(), other.y.to_radians());
        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();
        EARTH_RADIUS_M * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_distance_is_symmetric() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(3.0, 4.0);
        assert_eq!(a.euclidean_distance(&b), 5.0);
        assert_eq!(a.euclidean_distance(&b), b.euclidean_distance(&a));
    }

    #[test]
    fn haversine_distance_of_a_point_with_itself_is_zero() {
        let a = Location::new(51.5074, -0.1278);
        assert!(a.haversine_distance(&a) < 1e-6);
    }
}
