use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_CHECK_IN_START_HOUR: u8 = 10;
pub const DEFAULT_CHECK_IN_END_HOUR: u8 = 11;
pub const DEFAULT_CHECK_OUT_START_HOUR: u8 = 19;

/// Clock hours (0-23, operating timezone) bounding the daily windows.
///
/// Start/end ordering is deliberately not enforced: `start >= end` leaves the
/// check-in window empty.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceSettings {
    #[schema(example = 10)]
    pub check_in_start_hour: u8,
    #[schema(example = 11)]
    pub check_in_end_hour: u8,
    #[schema(example = 19)]
    pub check_out_start_hour: u8,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            check_in_start_hour: DEFAULT_CHECK_IN_START_HOUR,
            check_in_end_hour: DEFAULT_CHECK_IN_END_HOUR,
            check_out_start_hour: DEFAULT_CHECK_OUT_START_HOUR,
        }
    }
}

impl AttendanceSettings {
    /// Half-open `[start, end)` check-in window.
    pub fn allows_check_in(&self, hour: u32) -> bool {
        u32::from(self.check_in_start_hour) <= hour && hour < u32::from(self.check_in_end_hour)
    }

    pub fn allows_check_out(&self, hour: u32) -> bool {
        hour >= u32::from(self.check_out_start_hour)
    }

    #[cfg(test)]
    pub fn apply(&mut self, update: &SettingsUpdate) {
        if let Some(h) = update.check_in_start_hour {
            self.check_in_start_hour = h;
        }
        if let Some(h) = update.check_in_end_hour {
            self.check_in_end_hour = h;
        }
        if let Some(h) = update.check_out_start_hour {
            self.check_out_start_hour = h;
        }
    }
}

/// Partial settings update; absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SettingsUpdate {
    #[schema(example = 9, nullable = true)]
    pub check_in_start_hour: Option<u8>,
    #[schema(example = 11, nullable = true)]
    pub check_in_end_hour: Option<u8>,
    #[schema(example = 18, nullable = true)]
    pub check_out_start_hour: Option<u8>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.check_in_start_hour.is_none()
            && self.check_in_end_hour.is_none()
            && self.check_out_start_hour.is_none()
    }

    /// Column/value pairs for the fields actually present.
    pub fn fields(&self) -> Vec<(&'static str, u8)> {
        [
            ("check_in_start_hour", self.check_in_start_hour),
            ("check_in_end_hour", self.check_in_end_hour),
            ("check_out_start_hour", self.check_out_start_hour),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|v| (column, v)))
        .collect()
    }
}
