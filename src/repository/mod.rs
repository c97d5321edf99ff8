//! Storage seams. Each table gets a trait; production uses the MySQL
//! implementations, tests use `memory`.

pub mod attendance;
pub mod leave;
pub mod locations;
#[cfg(test)]
pub mod memory;
pub mod settings;

use std::sync::Arc;

use sqlx::MySqlPool;

pub use attendance::{AttendanceRepository, MySqlAttendanceRepository};
pub use leave::{LeaveRepository, MySqlLeaveRepository};
pub use locations::{LocationRepository, MySqlLocationRepository};
pub use settings::{MySqlSettingsRepository, SettingsRepository};

/// All repositories, shareable across workers.
#[derive(Clone)]
pub struct Repository {
    pub attendance: Arc<dyn AttendanceRepository>,
    pub leave: Arc<dyn LeaveRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub settings: Arc<dyn SettingsRepository>,
}

impl Repository {
    pub fn mysql(pool: MySqlPool) -> Self {
        Self {
            attendance: Arc::new(MySqlAttendanceRepository::new(pool.clone())),
            leave: Arc::new(MySqlLeaveRepository::new(pool.clone())),
            locations: Arc::new(MySqlLocationRepository::new(pool.clone())),
            settings: Arc::new(MySqlSettingsRepository::new(pool)),
        }
    }
}
