use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult, NearestLocation};
use crate::model::attendance::{
    AttendanceFilter, AttendanceRecord, CheckOut, LocationSnapshot, MarkAction, NewAttendance,
    work_hours_between,
};
use crate::repository::AttendanceRepository;
use crate::service::locations::LocationRegistry;
use crate::service::settings::SettingsStore;
use crate::utils::clock::{day_bounds, day_bounds_for_date, local_hour};

/// Result of an accepted mark.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarkOutcome {
    pub record: AttendanceRecord,
    #[schema(example = "HQ")]
    pub location: String,
    #[schema(example = 12)]
    pub distance_meters: f64,
    #[schema(example = 8.58, nullable = true)]
    pub work_hours: Option<f64>,
}

/// Local-date filter for reporting, resolved to day keys by the marker.
#[derive(Debug, Clone, Default)]
pub struct AttendanceQuery {
    pub user_id: Option<u64>,
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: u64,
    pub offset: u64,
}

/// Check-in / check-out state machine over the daily ledger.
#[derive(Clone)]
pub struct AttendanceMarker {
    settings: Arc<SettingsStore>,
    locations: LocationRegistry,
    ledger: Arc<dyn AttendanceRepository>,
    timezone: Tz,
}

impl AttendanceMarker {
    pub fn new(
        settings: Arc<SettingsStore>,
        locations: LocationRegistry,
        ledger: Arc<dyn AttendanceRepository>,
        timezone: Tz,
    ) -> Self {
        Self {
            settings,
            locations,
            ledger,
            timezone,
        }
    }

    /// Runs every gate in order; the first failure is returned as is.
    #[instrument(skip(self, now), fields(%action))]
    pub async fn mark(
        &self,
        user_id: u64,
        latitude: Option<f64>,
        longitude: Option<f64>,
        action: MarkAction,
        now: DateTime<Utc>,
    ) -> AppResult<MarkOutcome> {
        let (latitude, longitude) = validate_coordinates(latitude, longitude)?;

        let settings = self.settings.current();
        let hour = local_hour(now, self.timezone);
        match action {
            MarkAction::CheckIn if !settings.allows_check_in(hour) => {
                return Err(AppError::OutsideCheckInWindow {
                    start_hour: settings.check_in_start_hour,
                    end_hour: settings.check_in_end_hour,
                });
            }
            MarkAction::CheckOut if !settings.allows_check_out(hour) => {
                return Err(AppError::OutsideCheckOutWindow {
                    start_hour: settings.check_out_start_hour,
                });
            }
            _ => {}
        }

        let Some((location, distance)) = self.locations.nearest(latitude, longitude).await? else {
            warn!(user_id, "Mark rejected: no active attendance locations");
            return Err(AppError::OutOfRange(None));
        };
        if distance > f64::from(location.radius) {
            info!(user_id, location = %location.name, distance_meters = distance, "Mark rejected: out of range");
            return Err(AppError::OutOfRange(Some(NearestLocation {
                name: location.name,
                radius: location.radius,
                distance_meters: distance,
            })));
        }

        let snapshot = LocationSnapshot {
            latitude,
            longitude,
            location_id: location.id,
            location_name: location.name,
            distance_meters: distance,
        };

        let (day_start, day_end) = day_bounds(now, self.timezone)?;
        let existing = self.ledger.find_for_day(user_id, day_start, day_end).await?;

        let record = match action {
            MarkAction::CheckIn => {
                if let Some(record) = existing {
                    return Err(AppError::AlreadyCheckedIn(Box::new(record)));
                }
                self.check_in(user_id, day_start, day_end, now, snapshot.clone()).await?
            }
            MarkAction::CheckOut => {
                let record = existing.ok_or(AppError::NotCheckedIn)?;
                if record.is_checked_out() {
                    return Err(AppError::AlreadyCheckedOut(Box::new(record)));
                }
                self.check_out(record, now, snapshot.clone()).await?
            }
        };

        info!(
            user_id,
            record_id = record.id,
            location = %snapshot.location_name,
            distance_meters = snapshot.distance_meters,
            "Attendance marked"
        );

        Ok(MarkOutcome {
            work_hours: record.work_hours,
            record,
            location: snapshot.location_name,
            distance_meters: snapshot.distance_meters.round(),
        })
    }

    async fn check_in(
        &self,
        user_id: u64,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
        now: DateTime<Utc>,
        snapshot: LocationSnapshot,
    ) -> AppResult<AttendanceRecord> {
        let new = NewAttendance {
            user_id,
            date: day_start,
            check_in: now,
            check_in_location: snapshot,
        };

        match self.ledger.insert(&new).await {
            Ok(record) => Ok(record),
            // A concurrent check-in won the unique (user, date) slot
            Err(AppError::Duplicate) => {
                warn!(user_id, "Duplicate check-in rejected by storage");
                match self.ledger.find_for_day(user_id, day_start, day_end).await? {
                    Some(record) => Err(AppError::AlreadyCheckedIn(Box::new(record))),
                    None => Err(AppError::Internal(format!(
                        "duplicate check-in for user {user_id} but no record found"
                    ))),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn check_out(
        &self,
        record: AttendanceRecord,
        now: DateTime<Utc>,
        snapshot: LocationSnapshot,
    ) -> AppResult<AttendanceRecord> {
        let check_out = CheckOut {
            check_out: now,
            location: snapshot,
            work_hours: work_hours_between(record.check_in, now),
        };

        if !self.ledger.check_out(record.id, &check_out).await? {
            // Lost a race with another check-out for the same record
            let current = self.ledger.find_by_id(record.id).await?.unwrap_or(record);
            return Err(AppError::AlreadyCheckedOut(Box::new(current)));
        }

        self.ledger
            .find_by_id(record.id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("attendance record {} vanished", record.id)))
    }

    /// The user's record for the local day containing `now`.
    pub async fn today(&self, user_id: u64, now: DateTime<Utc>) -> AppResult<Option<AttendanceRecord>> {
        let (day_start, day_end) = day_bounds(now, self.timezone)?;
        self.ledger.find_for_day(user_id, day_start, day_end).await
    }

    /// Records matching the query, newest first, plus the total match count.
    pub async fn list(&self, query: &AttendanceQuery) -> AppResult<(Vec<AttendanceRecord>, i64)> {
        let filter = self.resolve(query)?;
        let records = self.ledger.list(&filter).await?;
        let total = self.ledger.count(&filter).await?;
        Ok((records, total))
    }

    fn resolve(&self, query: &AttendanceQuery) -> AppResult<AttendanceFilter> {
        let (from, to) = match (query.date, query.from, query.to) {
            (Some(date), _, _) => (Some(date), Some(date)),
            (None, from, to) => (from, to),
        };
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                return Err(AppError::InvalidInput("'to' must not be before 'from'".into()));
            }
        }

        let date_from = from
            .map(|d| day_bounds_for_date(d, self.timezone).map(|(start, _)| start))
            .transpose()?;
        let date_to = to
            .map(|d| day_bounds_for_date(d, self.timezone).map(|(_, end)| end))
            .transpose()?;

        Ok(AttendanceFilter {
            user_id: query.user_id,
            date_from,
            date_to,
            limit: query.limit,
            offset: query.offset,
        })
    }
}

fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<(f64, f64)> {
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(AppError::InvalidInput("Latitude and longitude are required".into()));
    };
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::InvalidInput(format!("Invalid latitude: {latitude}")));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::InvalidInput(format!("Invalid longitude: {longitude}")));
    }
    Ok((latitude, longitude))
}
