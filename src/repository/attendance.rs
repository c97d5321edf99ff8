use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::{AppError, AppResult, is_unique_violation};
use crate::model::attendance::{
    AttendanceFilter, AttendanceRecord, AttendanceStatus, CheckOut, LocationSnapshot, NewAttendance,
};
use crate::utils::db_utils::{SqlValue, bind_query_as, bind_scalar};

/// Per-user daily ledger. Storage enforces one row per `(user_id, date)`.
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// The user's record whose day key falls in `[day_start, day_end)`.
    async fn find_for_day(
        &self,
        user_id: u64,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceRecord>>;

    async fn find_by_id(&self, id: u64) -> AppResult<Option<AttendanceRecord>>;

    /// Fails with `AppError::Duplicate` when the user already has a record for that day.
    async fn insert(&self, new: &NewAttendance) -> AppResult<AttendanceRecord>;

    /// Moves a checked-in record to checked-out. Returns false if it was not checked in.
    async fn check_out(&self, id: u64, check_out: &CheckOut) -> AppResult<bool>;

    async fn list(&self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>>;

    async fn count(&self, filter: &AttendanceFilter) -> AppResult<i64>;
}

#[derive(FromRow)]
struct AttendanceRow {
    id: u64,
    user_id: u64,
    date: DateTime<Utc>,
    check_in: DateTime<Utc>,
    check_in_latitude: f64,
    check_in_longitude: f64,
    check_in_location_id: u64,
    check_in_location_name: String,
    check_in_distance: f64,
    check_out: Option<DateTime<Utc>>,
    check_out_latitude: Option<f64>,
    check_out_longitude: Option<f64>,
    check_out_location_id: Option<u64>,
    check_out_location_name: Option<String>,
    check_out_distance: Option<f64>,
    status: String,
    work_hours: Option<f64>,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<AttendanceStatus>()
            .map_err(|_| AppError::Internal(format!("unknown attendance status '{}'", row.status)))?;

        let check_out_location = match (
            row.check_out_latitude,
            row.check_out_longitude,
            row.check_out_location_id,
            row.check_out_location_name,
            row.check_out_distance,
        ) {
            (Some(latitude), Some(longitude), Some(location_id), Some(location_name), Some(distance_meters)) => {
                Some(LocationSnapshot {
                    latitude,
                    longitude,
                    location_id,
                    location_name,
                    distance_meters,
                })
            }
            _ => None,
        };

        Ok(AttendanceRecord {
            id: row.id,
            user_id: row.user_id,
            date: row.date,
            check_in: row.check_in,
            check_in_location: LocationSnapshot {
                latitude: row.check_in_latitude,
                longitude: row.check_in_longitude,
                location_id: row.check_in_location_id,
                location_name: row.check_in_location_name,
                distance_meters: row.check_in_distance,
            },
            check_out: row.check_out,
            check_out_location,
            status,
            work_hours: row.work_hours,
        })
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, user_id, date, check_in,
        check_in_latitude, check_in_longitude, check_in_location_id,
        check_in_location_name, check_in_distance,
        check_out,
        check_out_latitude, check_out_longitude, check_out_location_id,
        check_out_location_name, check_out_distance,
        status, work_hours
    FROM attendance_records
"#;

pub struct MySqlAttendanceRepository {
    pool: MySqlPool,
}

impl MySqlAttendanceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn where_clause(filter: &AttendanceFilter) -> (String, Vec<SqlValue>) {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args = Vec::new();

        if let Some(user_id) = filter.user_id {
            where_sql.push_str(" AND user_id = ?");
            args.push(SqlValue::U64(user_id));
        }
        if let Some(from) = filter.date_from {
            where_sql.push_str(" AND date >= ?");
            args.push(SqlValue::DateTime(from));
        }
        if let Some(to) = filter.date_to {
            where_sql.push_str(" AND date < ?");
            args.push(SqlValue::DateTime(to));
        }

        (where_sql, args)
    }
}

#[async_trait]
impl AttendanceRepository for MySqlAttendanceRepository {
    async fn find_for_day(
        &self,
        user_id: u64,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> AppResult<Option<AttendanceRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE user_id = ? AND date >= ? AND date < ? LIMIT 1");
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(user_id)
            .bind(day_start)
            .bind(day_end)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn find_by_id(&self, id: u64) -> AppResult<Option<AttendanceRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn insert(&self, new: &NewAttendance) -> AppResult<AttendanceRecord> {
        let loc = &new.check_in_location;
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (user_id, date, check_in,
                 check_in_latitude, check_in_longitude, check_in_location_id,
                 check_in_location_name, check_in_distance, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.date)
        .bind(new.check_in)
        .bind(loc.latitude)
        .bind(loc.longitude)
        .bind(loc.location_id)
        .bind(&loc.location_name)
        .bind(loc.distance_meters)
        .bind(AttendanceStatus::CheckedIn.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Duplicate
            } else {
                AppError::Database(e)
            }
        })?;

        let id = result.last_insert_id();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("attendance record {id} vanished after insert")))
    }

    async fn check_out(&self, id: u64, check_out: &CheckOut) -> AppResult<bool> {
        let loc = &check_out.location;
        let result = sqlx::query(
            r#"
            UPDATE attendance_records
            SET check_out = ?,
                check_out_latitude = ?,
                check_out_longitude = ?,
                check_out_location_id = ?,
                check_out_location_name = ?,
                check_out_distance = ?,
                work_hours = ?,
                status = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(check_out.check_out)
        .bind(loc.latitude)
        .bind(loc.longitude)
        .bind(loc.location_id)
        .bind(&loc.location_name)
        .bind(loc.distance_meters)
        .bind(check_out.work_hours)
        .bind(AttendanceStatus::CheckedOut.to_string())
        .bind(id)
        .bind(AttendanceStatus::CheckedIn.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(&self, filter: &AttendanceFilter) -> AppResult<Vec<AttendanceRecord>> {
        let (where_sql, args) = Self::where_clause(filter);
        let sql = format!("{SELECT_COLUMNS}{where_sql} ORDER BY date DESC, id DESC LIMIT ? OFFSET ?");

        let rows = bind_query_as(sqlx::query_as::<_, AttendanceRow>(&sql), &args)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }

    async fn count(&self, filter: &AttendanceFilter) -> AppResult<i64> {
        let (where_sql, args) = Self::where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM attendance_records{where_sql}");

        let total = bind_scalar(sqlx::query_scalar::<_, i64>(&sql), &args)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
