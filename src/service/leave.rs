use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    LeaveFilter, LeaveRequest, LeaveReview, LeaveStatus, LeaveSummary, LeaveType, NewLeaveRequest,
    inclusive_days,
};
use crate::repository::LeaveRepository;

/// Raw leave submission; every field is checked by `LeaveRequestValidator::create`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LeaveInput {
    #[schema(example = "sick")]
    pub leave_type: Option<String>,
    #[schema(example = "2026-01-01", format = "date")]
    pub start_date: Option<String>,
    #[schema(example = "2026-01-03", format = "date")]
    pub end_date: Option<String>,
    #[schema(example = "Fever")]
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct LeaveRequestValidator {
    repository: Arc<dyn LeaveRepository>,
}

impl LeaveRequestValidator {
    pub fn new(repository: Arc<dyn LeaveRepository>) -> Self {
        Self { repository }
    }

    /// Stores a new `pending` request unless it overlaps one of the employee's
    /// pending or approved requests.
    ///
    /// The overlap check and the insert are separate statements, so two
    /// simultaneous submissions by the same employee can both pass.
    #[instrument(skip(self, input))]
    pub async fn create(&self, employee_id: u64, input: LeaveInput) -> AppResult<LeaveRequest> {
        let leave_type = required(input.leave_type.as_deref(), "leave_type")?;
        let start_date = required(input.start_date.as_deref(), "start_date")?;
        let end_date = required(input.end_date.as_deref(), "end_date")?;
        let reason = required(input.reason.as_deref(), "reason")?;

        let leave_type = leave_type.parse::<LeaveType>().map_err(|_| {
            AppError::InvalidInput(
                "Invalid leave type. Allowed: annual, sick, personal, unpaid, other".into(),
            )
        })?;
        let start_date = parse_date(start_date, "start_date")?;
        let end_date = parse_date(end_date, "end_date")?;
        if end_date < start_date {
            return Err(AppError::InvalidInput("end_date cannot be before start_date".into()));
        }

        let overlapping = self
            .repository
            .find_overlapping(employee_id, start_date, end_date)
            .await?;
        if let Some(existing) = overlapping.first() {
            info!(employee_id, existing_id = existing.id, "Leave request overlaps");
            return Err(AppError::OverlappingLeave { existing_id: existing.id });
        }

        let request = self
            .repository
            .insert(&NewLeaveRequest {
                employee_id,
                leave_type,
                start_date,
                end_date,
                reason: reason.to_string(),
                total_days: inclusive_days(start_date, end_date),
            })
            .await?;

        info!(employee_id, leave_id = request.id, total_days = request.total_days, "Leave request submitted");
        Ok(request)
    }

    /// Moves a pending request to `approved` or `rejected`. Reviews are final.
    #[instrument(skip(self, note, now))]
    pub async fn review(
        &self,
        leave_id: u64,
        reviewer_id: u64,
        status: LeaveStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<LeaveRequest> {
        if status == LeaveStatus::Pending {
            return Err(AppError::InvalidInput("A review must approve or reject".into()));
        }

        let current = self
            .repository
            .find_by_id(leave_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request".into()))?;
        if current.status != LeaveStatus::Pending {
            return Err(AppError::NotPending(current.status));
        }

        let review = LeaveReview {
            status,
            reviewed_by: reviewer_id,
            reviewed_at: now,
            review_note: note.filter(|n| !n.trim().is_empty()),
        };
        if !self.repository.review(leave_id, &review).await? {
            // Someone else reviewed it between our read and write
            let latest = self.repository.find_by_id(leave_id).await?;
            let status = latest.map_or(current.status, |r| r.status);
            return Err(AppError::NotPending(status));
        }

        info!(leave_id, reviewer_id, %status, "Leave request reviewed");
        self.get(leave_id).await
    }

    pub async fn summarize(&self, employee_id: u64) -> AppResult<LeaveSummary> {
        let requests = self.repository.list_by_employee(employee_id).await?;
        Ok(LeaveSummary::from_requests(&requests))
    }

    pub async fn get(&self, leave_id: u64) -> AppResult<LeaveRequest> {
        self.repository
            .find_by_id(leave_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Leave request".into()))
    }

    pub async fn list(&self, filter: &LeaveFilter) -> AppResult<(Vec<LeaveRequest>, i64)> {
        let requests = self.repository.list(filter).await?;
        let total = self.repository.count(filter).await?;
        Ok((requests, total))
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> AppResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::InvalidInput(format!("{field} is required"))),
    }
}

fn parse_date(value: &str, field: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("{field} must be a valid date (YYYY-MM-DD)")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::MemoryLeaveRepository;

    const EMPLOYEE: u64 = 1000;
    const REVIEWER: u64 = 7;

    fn input(leave_type: &str, start: &str, end: &str) -> LeaveInput {
        LeaveInput {
            leave_type: Some(leave_type.to_string()),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            reason: Some("Family function".to_string()),
        }
    }

    fn validator() -> LeaveRequestValidator {
        LeaveRequestValidator::new(Arc::new(MemoryLeaveRepository::default()))
    }

    #[actix_web::test]
    async fn test_create_pending_with_total_days() {
        let v = validator();
        let req = v.create(EMPLOYEE, input("annual", "2026-01-30", "2026-02-02")).await.unwrap();
        assert_eq!(req.status, LeaveStatus::Pending);
        assert_eq!(req.leave_type, LeaveType::Annual);
        assert_eq!(req.total_days, 4);
        assert!(req.reviewed_by.is_none());
    }

    #[actix_web::test]
    async fn test_create_validation() {
        let v = validator();

        let missing = LeaveInput {
            reason: None,
            ..input("sick", "2026-01-01", "2026-01-02")
        };
        assert!(matches!(v.create(EMPLOYEE, missing).await, Err(AppError::InvalidInput(_))));

        let blank = LeaveInput {
            reason: Some("   ".to_string()),
            ..input("sick", "2026-01-01", "2026-01-02")
        };
        assert!(matches!(v.create(EMPLOYEE, blank).await, Err(AppError::InvalidInput(_))));

        for bad in [
            input("sick", "2026-02-30", "2026-03-01"),
            input("sick", "01/01/2026", "2026-01-02"),
            input("sick", "2026-01-05", "2026-01-04"),
            input("holiday", "2026-01-01", "2026-01-02"),
        ] {
            assert!(matches!(v.create(EMPLOYEE, bad).await, Err(AppError::InvalidInput(_))));
        }
    }

    #[actix_web::test]
    async fn test_overlap_with_pending_and_approved() {
        let v = validator();
        let first = v.create(EMPLOYEE, input("annual", "2026-01-10", "2026-01-15")).await.unwrap();

        let err = v.create(EMPLOYEE, input("sick", "2026-01-15", "2026-01-16")).await.unwrap_err();
        assert!(matches!(err, AppError::OverlappingLeave { existing_id } if existing_id == first.id));

        v.review(first.id, REVIEWER, LeaveStatus::Approved, None, Utc::now()).await.unwrap();
        let err = v.create(EMPLOYEE, input("sick", "2026-01-01", "2026-01-31")).await.unwrap_err();
        assert!(matches!(err, AppError::OverlappingLeave { .. }));

        // adjacent ranges and other employees are fine
        v.create(EMPLOYEE, input("sick", "2026-01-16", "2026-01-17")).await.unwrap();
        v.create(EMPLOYEE + 1, input("sick", "2026-01-10", "2026-01-15")).await.unwrap();
    }

    #[actix_web::test]
    async fn test_rejected_does_not_block() {
        let v = validator();
        let first = v.create(EMPLOYEE, input("annual", "2026-01-10", "2026-01-15")).await.unwrap();
        v.review(first.id, REVIEWER, LeaveStatus::Rejected, Some("Busy week".into()), Utc::now())
            .await
            .unwrap();

        let again = v.create(EMPLOYEE, input("annual", "2026-01-12", "2026-01-13")).await.unwrap();
        assert_eq!(again.status, LeaveStatus::Pending);
    }

    #[actix_web::test]
    async fn test_review_lifecycle() {
        let v = validator();
        let req = v.create(EMPLOYEE, input("personal", "2026-02-01", "2026-02-01")).await.unwrap();

        let now = Utc::now();
        let reviewed = v
            .review(req.id, REVIEWER, LeaveStatus::Approved, Some("Enjoy".into()), now)
            .await
            .unwrap();
        assert_eq!(reviewed.status, LeaveStatus::Approved);
        assert_eq!(reviewed.reviewed_by, Some(REVIEWER));
        assert_eq!(reviewed.reviewed_at, Some(now));
        assert_eq!(reviewed.review_note.as_deref(), Some("Enjoy"));

        let err = v
            .review(req.id, REVIEWER, LeaveStatus::Rejected, None, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotPending(LeaveStatus::Approved)));

        let err = v.review(999, REVIEWER, LeaveStatus::Approved, None, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let other = v.create(EMPLOYEE, input("personal", "2026-03-01", "2026-03-01")).await.unwrap();
        let err = v.review(other.id, REVIEWER, LeaveStatus::Pending, None, Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn test_summarize() {
        let v = validator();
        let a = v.create(EMPLOYEE, input("annual", "2026-01-01", "2026-01-03")).await.unwrap();
        let b = v.create(EMPLOYEE, input("sick", "2026-02-01", "2026-02-02")).await.unwrap();
        let c = v.create(EMPLOYEE, input("unpaid", "2026-03-01", "2026-03-05")).await.unwrap();
        v.create(EMPLOYEE, input("other", "2026-04-01", "2026-04-01")).await.unwrap();
        v.create(EMPLOYEE + 1, input("annual", "2026-01-01", "2026-01-10")).await.unwrap();

        v.review(a.id, REVIEWER, LeaveStatus::Approved, None, Utc::now()).await.unwrap();
        v.review(b.id, REVIEWER, LeaveStatus::Approved, None, Utc::now()).await.unwrap();
        v.review(c.id, REVIEWER, LeaveStatus::Rejected, None, Utc::now()).await.unwrap();

        let summary = v.summarize(EMPLOYEE).await.unwrap();
        assert_eq!(
            summary,
            LeaveSummary {
                pending: 1,
                approved: 2,
                rejected: 1,
                total_approved_days: 5,
            }
        );
    }

    #[actix_web::test]
    async fn test_list_filters() {
        let v = validator();
        v.create(EMPLOYEE, input("annual", "2026-01-01", "2026-01-03")).await.unwrap();
        let b = v.create(EMPLOYEE, input("sick", "2026-02-01", "2026-02-02")).await.unwrap();
        v.create(EMPLOYEE + 1, input("sick", "2026-02-01", "2026-02-02")).await.unwrap();
        v.review(b.id, REVIEWER, LeaveStatus::Rejected, None, Utc::now()).await.unwrap();

        let (requests, total) = v
            .list(&LeaveFilter {
                employee_id: Some(EMPLOYEE),
                status: Some(LeaveStatus::Pending),
                limit: 10,
                offset: 0,
            })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(requests[0].leave_type, LeaveType::Annual);
    }
}
