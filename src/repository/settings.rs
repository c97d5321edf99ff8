use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::error::AppResult;
use crate::model::attendance_settings::{AttendanceSettings, SettingsUpdate};
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

/// The settings table holds a single row with this id.
const SETTINGS_ROW_ID: u64 = 1;

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Reads the singleton, persisting the defaults first if it does not exist.
    async fn get_or_create(&self) -> AppResult<AttendanceSettings>;

    /// Overwrites the present fields and returns the stored result.
    async fn update(&self, update: &SettingsUpdate) -> AppResult<AttendanceSettings>;
}

pub struct MySqlSettingsRepository {
    pool: MySqlPool,
}

impl MySqlSettingsRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self) -> AppResult<Option<AttendanceSettings>> {
        let settings = sqlx::query_as::<_, AttendanceSettings>(
            r#"
            SELECT check_in_start_hour, check_in_end_hour, check_out_start_hour
            FROM attendance_settings
            WHERE id = ?
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }
}

#[async_trait]
impl SettingsRepository for MySqlSettingsRepository {
    async fn get_or_create(&self) -> AppResult<AttendanceSettings> {
        if let Some(settings) = self.fetch().await? {
            return Ok(settings);
        }

        let defaults = AttendanceSettings::default();
        // IGNORE: another worker may have created the row in the meantime
        sqlx::query(
            r#"
            INSERT IGNORE INTO attendance_settings
                (id, check_in_start_hour, check_in_end_hour, check_out_start_hour)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .bind(defaults.check_in_start_hour)
        .bind(defaults.check_in_end_hour)
        .bind(defaults.check_out_start_hour)
        .execute(&self.pool)
        .await?;

        tracing::info!(?defaults, "Created default attendance settings");

        Ok(self.fetch().await?.unwrap_or(defaults))
    }

    async fn update(&self, update: &SettingsUpdate) -> AppResult<AttendanceSettings> {
        self.get_or_create().await?;

        let fields = update
            .fields()
            .into_iter()
            .map(|(column, hour)| (column, SqlValue::U8(hour)))
            .collect();
        let sql = build_update_sql("attendance_settings", fields, "id", SETTINGS_ROW_ID)?;
        execute_update(&self.pool, sql).await?;

        self.get_or_create().await
    }
}
