//! In-process repositories for tests. They honor the same constraints as the
//! MySQL schema: unique `(user_id, date)` and pending-only reviews.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AppError, AppResult};
use crate::model::attendance::{
    AttendanceFilter, AttendanceRecord, AttendanceStatus, CheckOut, NewAttendance,
};
use crate::model::attendance_location::AttendanceLocation;
use crate::model::attendance_settings::{AttendanceSettings, SettingsUpdate};
use crate::model::leave_request::{
    LeaveFilter, LeaveRequest, LeaveReview, LeaveStatus, NewLeaveRequest, ranges_overlap,
};

use super::{AttendanceRepository, LeaveRepository, LocationRepository, SettingsRepository};

fn page<T: Clone>(items: Vec<T>, limit: u64, offset: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    items.into_iter().skip(offset).take(limit).collect()
}

#[derive(Default)]
pub struct MemorySettingsRepository {
    row: Mutex<Option<AttendanceSettings>>,
}

impl MemorySettingsRepository {
    pub fn with(settings: AttendanceSettings) -> Self {
        Self {
            row: Mutex::new(Some(settings)),
        }
    }

    pub fn stored(&self) -> Option<AttendanceSettings> {
        *self.row.lock().unwrap()
    }
}

#[async_trait]
impl SettingsRepository for MemorySettingsRepository {
    async fn get_or_create(&self) -> AppResult<AttendanceSettings> {
        let mut row = self.row.lock().unwrap();
        Ok(*row.get_or_insert_with(AttendanceSettings::default))
    }

    async fn update(&self, update: &SettingsUpdate) -> AppResult<AttendanceSettings> {
        let mut row = self.row.lock().unwrap();
        let settings = row.get_or_insert_with(AttendanceSettings::default);
        settings.apply(update);
        Ok(*settings)
    }
}

#[derive(Default)]
pub struct MemoryLocationRepository {
    locations: Vec<AttendanceLocation>,
}

impl MemoryLocationRepository {
    pub fn new(locations: Vec<AttendanceLocation>) -> Self {
        Self { locations }
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationRepository {
    async fn active_locations(&self) -> AppResult<Vec<AttendanceLocation>> {
        Ok(self.locations.iter().filter(|l| l.is_active).cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryAttendanceRepository {
    records: Mutex<Vec<AttendanceRecord>>,
}

impl MemoryAttendanceRepository {
    pub fn all(&self) -> Vec<AttendanceRecord> {
        self.records.lock().unwrap().clone()
    }

    fn matches(record: &AttendanceRecord, filter: &AttendanceFilter) -> bool {
        filter.user_id.is_none_or(|u| record.user_id == u)
            && filter.date_from.is_none_or(|from| record.date >= from)
            && filter.date_to.is_none_or(|to| record.date < to)
    }
}

#[async_trait]
impl AttendanceRepository for MemoryAttendanceRepository {
    async fn find_for_day(
        &self,
        user_id: u64,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.date >= day_start && r.date < day_end)
            .cloned())
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<AttendanceRecord>> {
        Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, new: &NewAttendance) -> AppResult<AttendanceRecord> {
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.user_id == new.user_id && r.date == new.date)
        {
            return Err(AppError::Duplicate);
        }

        let record = AttendanceRecord {
            id: records.len() as u64 + 1,
            user_id: new.user_id,
            date: new.date,
            check_in: new.check_in,
            check_in_location: new.check_in_location.clone(),
            check_out: None,
            check_out_location: None,
            status: AttendanceStatus::CheckedIn,
            work_hours: None,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn check_out(&self, id: u64, check_out: &CheckOut) -> AppResult<bool> {
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.id == id && r.status == AttendanceStatus::CheckedIn)
        {
            Some(record) => {
                record.check_out = Some(check_out.check_out);
                record.check_out_location = Some(check_out.location.clone());
                record.work_hours = Some(check_out.work_hours);
                record.status = AttendanceStatus::CheckedOut;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        let mut matching: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| Self::matches(r, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(page(matching, filter.limit, filter.offset))
    }

    async fn count(&self, filter: &AttendanceFilter) -> AppResult<i64> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().filter(|r| Self::matches(r, filter)).count() as i64)
    }
}

#[derive(Default)]
pub struct MemoryLeaveRepository {
    requests: Mutex<Vec<LeaveRequest>>,
}

impl MemoryLeaveRepository {
    fn matches(request: &LeaveRequest, filter: &LeaveFilter) -> bool {
        filter.employee_id.is_none_or(|e| request.employee_id == e)
            && filter.status.is_none_or(|s| request.status == s)
    }
}

#[async_trait]
impl LeaveRepository for MemoryLeaveRepository {
    async fn insert(&self, new: &NewLeaveRequest) -> AppResult<LeaveRequest> {
        let mut requests = self.requests.lock().unwrap();
        let request = LeaveRequest {
            id: requests.len() as u64 + 1,
            employee_id: new.employee_id,
            leave_type: new.leave_type,
            start_date: new.start_date,
            end_date: new.end_date,
            reason: new.reason.clone(),
            status: LeaveStatus::Pending,
            total_days: new.total_days,
            reviewed_by: None,
            reviewed_at: None,
            review_note: None,
            created_at: Some(Utc::now()),
        };
        requests.push(request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        Ok(self.requests.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn find_overlapping(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.status != LeaveStatus::Rejected
                    && ranges_overlap(r.start_date, r.end_date, start, end)
            })
            .cloned()
            .collect())
    }

    async fn review(&self, id: u64, review: &LeaveReview) -> AppResult<bool> {
        let mut requests = self.requests.lock().unwrap();
        match requests
            .iter_mut()
            .find(|r| r.id == id && r.status == LeaveStatus::Pending)
        {
            Some(request) => {
                request.status = review.status;
                request.reviewed_by = Some(review.reviewed_by);
                request.reviewed_at = Some(review.reviewed_at);
                request.review_note = review.review_note.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &LeaveFilter) -> AppResult<Vec<LeaveRequest>> {
        let mut matching: Vec<_> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| Self::matches(r, filter))
            .cloned()
            .collect();
        matching.reverse();
        Ok(page(matching, filter.limit, filter.offset))
    }

    async fn count(&self, filter: &LeaveFilter) -> AppResult<i64> {
        let requests = self.requests.lock().unwrap();
        Ok(requests.iter().filter(|r| Self::matches(r, filter)).count() as i64)
    }
}
