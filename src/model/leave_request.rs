use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveType {
    Annual,
    Sick,
    Personal,
    Unpaid,
    Other,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family function")]
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(example = 3)]
    pub total_days: u32,
    #[schema(nullable = true)]
    pub reviewed_by: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[schema(nullable = true)]
    pub review_note: Option<String>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A validated request ready to be stored as `pending`.
#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub total_days: u32,
}

#[derive(Debug, Clone)]
pub struct LeaveReview {
    pub status: LeaveStatus,
    pub reviewed_by: u64,
    pub reviewed_at: DateTime<Utc>,
    pub review_note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub employee_id: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LeaveSummary {
    #[schema(example = 1)]
    pub pending: u64,
    #[schema(example = 2)]
    pub approved: u64,
    #[schema(example = 0)]
    pub rejected: u64,
    #[schema(example = 6)]
    pub total_approved_days: u64,
}

impl LeaveSummary {
    pub fn from_requests(requests: &[LeaveRequest]) -> Self {
        requests.iter().fold(Self::default(), |mut acc, req| {
            match req.status {
                LeaveStatus::Pending => acc.pending += 1,
                LeaveStatus::Approved => {
                    acc.approved += 1;
                    acc.total_approved_days += u64::from(req.total_days);
                }
                LeaveStatus::Rejected => acc.rejected += 1,
            }
            acc
        })
    }
}

/// Inclusive calendar-day count of `[start, end]`.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
    u32::try_from((end - start).num_days() + 1).unwrap_or(0)
}

#[cfg(test)]
/// Closed ranges `[a_start, a_end]` and `[b_start, b_end]` share at least one day.
pub fn ranges_overlap(a_start: NaiveDate, a_end: NaiveDate, b_start: NaiveDate, b_end: NaiveDate) -> bool {
    a_start <= b_end && a_end >= b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_inclusive_days() {
        assert_eq!(inclusive_days(d("2026-01-01"), d("2026-01-01")), 1);
        assert_eq!(inclusive_days(d("2026-01-30"), d("2026-02-02")), 4);
    }

    #[test]
    fn test_ranges_overlap() {
        assert!(ranges_overlap(d("2026-01-01"), d("2026-01-05"), d("2026-01-05"), d("2026-01-07")));
        assert!(ranges_overlap(d("2026-01-01"), d("2026-01-10"), d("2026-01-03"), d("2026-01-04")));
        assert!(!ranges_overlap(d("2026-01-01"), d("2026-01-04"), d("2026-01-05"), d("2026-01-07")));
    }

    #[test]
    fn test_leave_type_parse() {
        assert_eq!("Sick".parse::<LeaveType>().unwrap(), LeaveType::Sick);
        assert_eq!("personal".parse::<LeaveType>().unwrap(), LeaveType::Personal);
        assert!("sabbatical".parse::<LeaveType>().is_err());
    }
}
