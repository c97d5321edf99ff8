/// Mean Earth radius used by the spherical approximation.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters between two points given in degrees (haversine).
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lng2 - lng1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Latitude offset, in degrees, that moves a point `meters` north along its meridian.
#[cfg(test)]
pub fn meters_north(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_METERS).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HQ: (f64, f64) = (28.6139, 77.2090);

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance_meters(HQ.0, HQ.1, HQ.0, HQ.1), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let other = (19.0760, 72.8777);
        let ab = distance_meters(HQ.0, HQ.1, other.0, other.1);
        let ba = distance_meters(other.0, other.1, HQ.0, HQ.1);
        assert!((ab - ba).abs() < 1e-6);
        // Delhi to Mumbai is roughly 1150 km
        assert!((1_100_000.0..1_200_000.0).contains(&ab));
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.93).abs() < 0.1);
    }

    #[test]
    fn test_meters_north_roundtrip() {
        let d = distance_meters(HQ.0, HQ.1, HQ.0 + meters_north(200.0), HQ.1);
        assert!((d - 200.0).abs() < 1e-6);
    }
}
