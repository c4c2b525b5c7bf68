use crate::domain::model::Coordinate;

/// Mean Earth radius in miles (spherical approximation).
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle distance in miles using the haversine formula.
pub fn haversine_miles(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }

    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = lat_b - lat_a;
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    // 浮點誤差可能讓 sqrt(h) 略大於 1
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(latitude: f64, longitude: f64) -> Coordinate {
        Coordinate::new(latitude, longitude).unwrap()
    }

    fn within_tolerance(actual: f64, expected: f64) -> bool {
        ((actual - expected) / expected).abs() <= 0.001
    }

    #[test]
    fn test_same_point_is_zero() {
        let manhattan = coord(40.7484, -73.9967);
        assert_eq!(haversine_miles(manhattan, manhattan), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let manhattan = coord(40.7484, -73.9967);
        let beverly_hills = coord(34.1030, -118.4105);

        assert_eq!(
            haversine_miles(manhattan, beverly_hills),
            haversine_miles(beverly_hills, manhattan)
        );
    }

    #[test]
    fn test_nashville_to_los_angeles_reference() {
        // 經典範例：BNA (36.12, -86.67) → LAX (33.94, -118.40)
        let bna = coord(36.12, -86.67);
        let lax = coord(33.94, -118.40);

        let miles = haversine_miles(bna, lax);
        assert!(within_tolerance(miles, 1793.57), "got {}", miles);
    }

    #[test]
    fn test_manhattan_to_stamford() {
        let manhattan = coord(40.7484, -73.9967);
        let stamford = coord(41.0534, -73.5387);

        let miles = haversine_miles(manhattan, stamford);
        assert!(within_tolerance(miles, 31.88), "got {}", miles);
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let north = coord(90.0, 0.0);
        let south = coord(-90.0, 0.0);

        let miles = haversine_miles(north, south);
        assert!(miles.is_finite());
        assert!(within_tolerance(miles, std::f64::consts::PI * EARTH_RADIUS_MILES));
    }
}
