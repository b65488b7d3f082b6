/// Mean earth radius in meters, spherical approximation.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two lat/long points in meters (haversine).
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero() {
        assert_eq!(distance_meters(23.8103, 90.4125, 23.8103, 90.4125), 0.0);
    }

    #[test]
    fn symmetric() {
        let ab = distance_meters(23.8103, 90.4125, 23.7806, 90.2792);
        let ba = distance_meters(23.7806, 90.2792, 23.8103, 90.4125);
        assert_eq!(ab, ba);
    }

    #[test]
    fn known_distance_dhaka_to_chittagong() {
        // Dhaka (23.8103, 90.4125) to Chittagong (22.3569, 91.7832), ~214 km.
        let d = distance_meters(23.8103, 90.4125, 22.3569, 91.7832);
        assert!((d - 214_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn short_distance_is_plausible() {
        // Roughly 111 m per 0.001 degree of latitude.
        let d = distance_meters(23.8103, 90.4125, 23.8113, 90.4125);
        assert!((d - 111.0).abs() < 1.0, "got {d}");
    }
}
