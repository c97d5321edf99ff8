use std::sync::Arc;

use crate::error::AppResult;
use crate::model::attendance_location::AttendanceLocation;
use crate::repository::LocationRepository;
use crate::utils::geo::distance_meters;

/// Read-only view over the administered geofences.
#[derive(Clone)]
pub struct LocationRegistry {
    repository: Arc<dyn LocationRepository>,
}

impl LocationRegistry {
    pub fn new(repository: Arc<dyn LocationRepository>) -> Self {
        Self { repository }
    }

    pub async fn active_locations(&self) -> AppResult<Vec<AttendanceLocation>> {
        self.repository.active_locations().await
    }

    /// The closest active location to `(latitude, longitude)` and its distance in meters.
    pub async fn nearest(&self, latitude: f64, longitude: f64) -> AppResult<Option<(AttendanceLocation, f64)>> {
        let locations = self.active_locations().await?;
        Ok(nearest_of(locations, latitude, longitude))
    }
}

fn nearest_of(
    locations: Vec<AttendanceLocation>,
    latitude: f64,
    longitude: f64,
) -> Option<(AttendanceLocation, f64)> {
    locations
        .into_iter()
        .map(|loc| {
            let distance = distance_meters(latitude, longitude, loc.latitude, loc.longitude);
            (loc, distance)
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
}
