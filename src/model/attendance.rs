use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    CheckedIn,
    CheckedOut,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MarkAction {
    CheckIn,
    CheckOut,
}

/// Where the user stood when marking, and which geofence accepted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LocationSnapshot {
    #[schema(example = 28.6139)]
    pub latitude: f64,
    #[schema(example = 77.209)]
    pub longitude: f64,
    #[schema(example = 1)]
    pub location_id: u64,
    #[schema(example = "HQ")]
    pub location_name: String,
    #[schema(example = 12.4)]
    pub distance_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    /// UTC instant of the local midnight that starts this record's business day
    #[schema(example = "2026-03-09T18:30:00Z", format = "date-time", value_type = String)]
    pub date: DateTime<Utc>,
    #[schema(example = "2026-03-10T05:00:00Z", format = "date-time", value_type = String)]
    pub check_in: DateTime<Utc>,
    pub check_in_location: LocationSnapshot,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub check_out: Option<DateTime<Utc>>,
    pub check_out_location: Option<LocationSnapshot>,
    pub status: AttendanceStatus,
    #[schema(example = 8.58)]
    pub work_hours: Option<f64>,
}

/// A check-in about to be written to the ledger.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: u64,
    pub date: DateTime<Utc>,
    pub check_in: DateTime<Utc>,
    pub check_in_location: LocationSnapshot,
}

/// Fields written once when a record is checked out.
#[derive(Debug, Clone)]
pub struct CheckOut {
    pub check_out: DateTime<Utc>,
    pub location: LocationSnapshot,
    pub work_hours: f64,
}

/// Query surface for reporting. Instants are UTC day keys, already resolved
/// from local dates by the caller.
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub user_id: Option<u64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub limit: u64,
    pub offset: u64,
}

impl AttendanceRecord {
    pub fn is_checked_out(&self) -> bool {
        self.status == AttendanceStatus::CheckedOut
    }
}

/// Elapsed time between two instants in fractional hours.
pub fn work_hours_between(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> f64 {
    (check_out - check_in).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_work_hours_between() {
        let check_in = Utc.with_ymd_and_hms(2026, 3, 10, 5, 0, 0).unwrap();
        let check_out = Utc.with_ymd_and_hms(2026, 3, 10, 13, 35, 0).unwrap();
        let hours = work_hours_between(check_in, check_out);
        assert!((hours - 8.5833).abs() < 0.001);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(AttendanceStatus::CheckedIn.to_string(), "checked-in");
        assert_eq!("checked-out".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::CheckedOut);
        assert_eq!(serde_json::to_string(&MarkAction::CheckOut).unwrap(), "\"check-out\"");
    }
}
