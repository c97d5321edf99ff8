use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::error::AppResult;
use crate::model::attendance_location::AttendanceLocation;

#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Geofences with `is_active = true`.
    async fn active_locations(&self) -> AppResult<Vec<AttendanceLocation>>;
}

pub struct MySqlLocationRepository {
    pool: MySqlPool,
}

impl MySqlLocationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LocationRepository for MySqlLocationRepository {
    async fn active_locations(&self) -> AppResult<Vec<AttendanceLocation>> {
        let locations = sqlx::query_as::<_, AttendanceLocation>(
            r#"
            SELECT id, name, address, latitude, longitude, radius, is_active
            FROM attendance_locations
            WHERE is_active = TRUE
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(locations)
    }
}
