use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    LeaveFilter, LeaveRequest, LeaveReview, LeaveStatus, LeaveType, NewLeaveRequest,
};
use crate::utils::db_utils::{SqlValue, bind_query_as, bind_scalar};

#[async_trait]
pub trait LeaveRepository: Send + Sync {
    async fn insert(&self, new: &NewLeaveRequest) -> AppResult<LeaveRequest>;

    async fn find_by_id(&self, id: u64) -> AppResult<Option<LeaveRequest>>;

    /// The employee's pending/approved requests intersecting `[start, end]`.
    async fn find_overlapping(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>>;

    /// Applies a review only while the request is still pending. Returns false otherwise.
    async fn review(&self, id: u64, review: &LeaveReview) -> AppResult<bool>;

    async fn list_by_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>>;

    async fn list(&self, filter: &LeaveFilter) -> AppResult<Vec<LeaveRequest>>;

    async fn count(&self, filter: &LeaveFilter) -> AppResult<i64>;
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: u64,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: String,
    status: String,
    total_days: u32,
    reviewed_by: Option<u64>,
    reviewed_at: Option<DateTime<Utc>>,
    review_note: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = AppError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let leave_type = row
            .leave_type
            .parse::<LeaveType>()
            .map_err(|_| AppError::Internal(format!("unknown leave type '{}'", row.leave_type)))?;
        let status = row
            .status
            .parse::<LeaveStatus>()
            .map_err(|_| AppError::Internal(format!("unknown leave status '{}'", row.status)))?;

        Ok(LeaveRequest {
            id: row.id,
            employee_id: row.employee_id,
            leave_type,
            start_date: row.start_date,
            end_date: row.end_date,
            reason: row.reason,
            status,
            total_days: row.total_days,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            review_note: row.review_note,
            created_at: row.created_at,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, employee_id, leave_type, start_date, end_date, reason, status,
        total_days, reviewed_by, reviewed_at, review_note, created_at
    FROM leave_requests
"#;

pub struct MySqlLeaveRepository {
    pool: MySqlPool,
}

impl MySqlLeaveRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &LeaveFilter) -> (String, Vec<SqlValue>) {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args = Vec::new();

        if let Some(employee_id) = filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(SqlValue::U64(employee_id));
        }
        if let Some(status) = filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(SqlValue::String(status.to_string()));
        }

        (where_sql, args)
    }

    async fn fetch_rows(&self, sql: &str, args: &[SqlValue]) -> AppResult<Vec<LeaveRequest>> {
        let rows = bind_query_as(sqlx::query_as::<_, LeaveRow>(sql), args)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }
}

#[async_trait]
impl LeaveRepository for MySqlLeaveRepository {
    async fn insert(&self, new: &NewLeaveRequest) -> AppResult<LeaveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, leave_type, start_date, end_date, reason, status, total_days)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.leave_type.to_string())
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(&new.reason)
        .bind(LeaveStatus::Pending.to_string())
        .bind(new.total_days)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("leave request {id} vanished after insert")))
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let rows = self.fetch_rows(&sql, &[SqlValue::U64(id)]).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_overlapping(
        &self,
        employee_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE employee_id = ? AND status <> ? AND start_date <= ? AND end_date >= ? ORDER BY start_date"
        );
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(employee_id)
            .bind(LeaveStatus::Rejected.to_string())
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn review(&self, id: u64, review: &LeaveReview) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, reviewed_by = ?, reviewed_at = ?, review_note = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(review.status.to_string())
        .bind(review.reviewed_by)
        .bind(review.reviewed_at)
        .bind(&review.review_note)
        .bind(id)
        .bind(LeaveStatus::Pending.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_by_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!("{SELECT_COLUMNS} WHERE employee_id = ? ORDER BY start_date DESC");
        self.fetch_rows(&sql, &[SqlValue::U64(employee_id)]).await
    }

    async fn list(&self, filter: &LeaveFilter) -> AppResult<Vec<LeaveRequest>> {
        let (where_sql, mut args) = Self::where_clause(filter);
        let sql = format!("{SELECT_COLUMNS}{where_sql} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        args.push(SqlValue::U64(filter.limit));
        args.push(SqlValue::U64(filter.offset));
        self.fetch_rows(&sql, &args).await
    }

    async fn count(&self, filter: &LeaveFilter) -> AppResult<i64> {
        let (where_sql, args) = Self::where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM leave_requests{where_sql}");

        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&sql), &args)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
