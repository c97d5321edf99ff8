use std::sync::{Arc, RwLock};

use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::attendance_settings::{AttendanceSettings, SettingsUpdate};
use crate::repository::SettingsRepository;

/// Window configuration, loaded once at startup and handed to whoever needs it.
///
/// Reads are served from the in-process snapshot; `update` writes through to
/// storage and `reload` picks up changes made by other instances.
pub struct SettingsStore {
    repository: Arc<dyn SettingsRepository>,
    current: RwLock<AttendanceSettings>,
}

impl SettingsStore {
    pub async fn load(repository: Arc<dyn SettingsRepository>) -> AppResult<Self> {
        let settings = repository.get_or_create().await?;
        info!(?settings, "Attendance settings loaded");
        Ok(Self {
            repository,
            current: RwLock::new(settings),
        })
    }

    pub fn current(&self) -> AttendanceSettings {
        // The guarded value is Copy, so a poisoned lock still holds a whole snapshot
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    pub async fn reload(&self) -> AppResult<AttendanceSettings> {
        let settings = self.repository.get_or_create().await?;
        self.replace(settings);
        Ok(settings)
    }

    /// Overwrites the given hours. Each must be a clock hour; their relative
    /// order is not checked.
    #[instrument(skip(self))]
    pub async fn update(&self, update: SettingsUpdate) -> AppResult<AttendanceSettings> {
        if update.is_empty() {
            return Err(AppError::InvalidInput("No fields provided for update".into()));
        }
        if let Some((column, hour)) = update.fields().into_iter().find(|(_, h)| *h > 23) {
            return Err(AppError::InvalidInput(format!(
                "{column} must be between 0 and 23, got {hour}"
            )));
        }

        let settings = self.repository.update(&update).await?;
        self.replace(settings);
        info!(?settings, "Attendance settings updated");
        Ok(settings)
    }

    fn replace(&self, settings: AttendanceSettings) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = settings;
    }
}
