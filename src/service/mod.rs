//! Time & presence services, wired once at startup and shared by handlers.

pub mod attendance;
pub mod leave;
pub mod locations;
pub mod settings;

use std::sync::Arc;

use chrono_tz::Tz;

use crate::error::AppResult;
use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub settings: Arc<settings::SettingsStore>,
    pub locations: locations::LocationRegistry,
    pub attendance: attendance::AttendanceMarker,
    pub leave: leave::LeaveRequestValidator,
}

impl Services {
    /// Loads the settings snapshot and builds every service on top of `repository`.
    pub async fn new(repository: Repository, timezone: Tz) -> AppResult<Self> {
        let settings = Arc::new(settings::SettingsStore::load(repository.settings).await?);
        let locations = locations::LocationRegistry::new(repository.locations);

        Ok(Self {
            attendance: attendance::AttendanceMarker::new(
                settings.clone(),
                locations.clone(),
                repository.attendance,
                timezone,
            ),
            leave: leave::LeaveRequestValidator::new(repository.leave),
            locations,
            settings,
        })
    }
}
