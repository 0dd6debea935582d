/// Mean Earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in km between two lat/lng points given in degrees.
///
/// Coordinates are not range-checked; out-of-range input yields a number,
/// not an error.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // rounding can push `a` a hair past 1.0 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const UAP: (f64, f64) = (23.8151, 90.4255);
    const MIRPUR: (f64, f64) = (23.8067, 90.3683);

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_km(UAP.0, UAP.1, UAP.0, UAP.1), 0.0);
        assert_eq!(haversine_km(-45.0, 170.0, -45.0, 170.0), 0.0);
    }

    #[test]
    fn symmetric() {
        let pairs = [
            (UAP, MIRPUR),
            ((0.0, 0.0), (10.0, 10.0)),
            ((51.5, -0.12), (40.7, -74.0)),
            ((-33.9, 151.2), (35.7, 139.7)),
        ];
        for (a, b) in pairs {
            let ab = haversine_km(a.0, a.1, b.0, b.1);
            let ba = haversine_km(b.0, b.1, a.0, a.1);
            assert!((ab - ba).abs() < 1e-9, "{ab} vs {ba}");
        }
    }

    #[test]
    fn known_distances() {
        // one degree of longitude on the equator
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.195).abs() < 0.01, "got {d}");

        // UAP campus to Mirpur is a little under 6 km
        let d = haversine_km(UAP.0, UAP.1, MIRPUR.0, MIRPUR.1);
        assert!(d > 5.5 && d < 6.0, "got {d}");
    }

    #[test]
    fn antipodal_points_do_not_nan() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }
}
