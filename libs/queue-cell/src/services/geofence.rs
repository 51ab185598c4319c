use crate::models::GeofenceCheck;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, haversine formula.
pub fn haversine_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Proximity gate for location-verified actions. The distance is always
/// reported so callers can show it either way.
pub struct GeofenceService {
    radius_km: f64,
}

impl GeofenceService {
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    pub fn is_within_service_area(
        &self,
        user_lat: f64,
        user_lng: f64,
        target_lat: f64,
        target_lng: f64,
    ) -> GeofenceCheck {
        let distance_km = haversine_distance_km(user_lat, user_lng, target_lat, target_lng);
        GeofenceCheck {
            within_range: distance_km <= self.radius_km,
            distance_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_identical_points() {
        let d = haversine_distance_km(6.5244, 3.3792, 6.5244, 3.3792);
        assert!(d < 1e-9);
    }

    #[test]
    fn lagos_to_ibadan_is_roughly_a_hundred_kilometres() {
        // Lagos (6.5244, 3.3792) to Ibadan (7.3775, 3.9470).
        let d = haversine_distance_km(6.5244, 3.3792, 7.3775, 3.9470);
        assert!(d > 100.0 && d < 125.0, "unexpected distance: {}", d);
    }

    #[test]
    fn london_to_paris_distance() {
        let d = haversine_distance_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d - 343.5).abs() < 5.0, "unexpected distance: {}", d);
    }

    #[test]
    fn gate_reports_distance_on_both_outcomes() {
        let service = GeofenceService::new(100.0);

        let near = service.is_within_service_area(6.5244, 3.3792, 6.5250, 3.3800);
        assert!(near.within_range);
        assert!(near.distance_km < 1.0);

        let far = service.is_within_service_area(6.5244, 3.3792, 51.5074, -0.1278);
        assert!(!far.within_range);
        assert!(far.distance_km > 4000.0);
    }
}
