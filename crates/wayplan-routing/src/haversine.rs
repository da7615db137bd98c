//! Straight-line distance fallback for when the matrix collaborator is
//! unreachable. A great-circle estimate keeps the distance preview alive
//! instead of blanking it.

use crate::types::Location;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates, in meters.
#[must_use]
pub fn haversine_distance_m(a: Location, b: Location) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * h.sqrt().asin() * EARTH_RADIUS_M
}

/// Symmetric straight-line distance matrix over `locations`, in meters.
#[must_use]
pub fn straight_line_matrix(locations: &[Location]) -> Vec<Vec<f64>> {
    let n = locations.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = haversine_distance_m(locations[i], locations[j]);
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(lat: f64, lng: f64) -> Location {
        Location { lat, lng }
    }

    #[test]
    fn zero_distance_for_identical_points() {
        let p = loc(37.7749, -122.4194);
        assert!(haversine_distance_m(p, p).abs() < 1e-6);
    }

    #[test]
    fn sf_to_oakland_is_roughly_13_km() {
        let sf = loc(37.7749, -122.4194);
        let oakland = loc(37.8044, -122.2712);
        let d = haversine_distance_m(sf, oakland);
        assert!((12_000.0..15_000.0).contains(&d), "distance: {d}");
    }

    #[test]
    fn one_degree_of_latitude_is_roughly_111_km() {
        let d = haversine_distance_m(loc(0.0, 0.0), loc(1.0, 0.0));
        assert!((110_000.0..112_500.0).contains(&d), "distance: {d}");
    }

    #[test]
    fn matrix_is_symmetric_with_zero_diagonal() {
        let points = vec![loc(0.0, 0.0), loc(0.0, 1.0), loc(1.0, 1.0)];
        let m = straight_line_matrix(&points);
        for i in 0..3 {
            assert!(m[i][i].abs() < 1e-9);
            for j in 0..3 {
                assert!((m[i][j] - m[j][i]).abs() < 1e-9);
            }
        }
        assert!(m[0][1] > 0.0);
    }
}
