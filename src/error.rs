use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::model::{attendance::AttendanceRecord, leave_request::LeaveStatus};

/// The closest active geofence, reported back even when a mark is rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestLocation {
    pub name: String,
    pub radius: u32,
    pub distance_meters: f64,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Check-in is only allowed between {start_hour}:00 and {end_hour}:00")]
    OutsideCheckInWindow { start_hour: u8, end_hour: u8 },

    #[error("Check-out is only allowed after {start_hour}:00")]
    OutsideCheckOutWindow { start_hour: u8 },

    #[error("{}", out_of_range_message(.0.as_ref()))]
    OutOfRange(Option<NearestLocation>),

    #[error("Already checked in today")]
    AlreadyCheckedIn(Box<AttendanceRecord>),

    #[error("Already checked out today")]
    AlreadyCheckedOut(Box<AttendanceRecord>),

    #[error("No check-in found for today")]
    NotCheckedIn,

    #[error("Leave request overlaps an existing request ({existing_id})")]
    OverlappingLeave { existing_id: u64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Only pending requests can be reviewed (current status: {0})")]
    NotPending(LeaveStatus),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Unique-key violation reported by storage.
    #[error("Duplicate entry")]
    Duplicate,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

fn out_of_range_message(nearest: Option<&NearestLocation>) -> String {
    match nearest {
        Some(n) => format!(
            "You are {:.0}m from {}; marking requires being within {}m",
            n.distance_meters, n.name, n.radius
        ),
        None => "No active attendance location is configured".to_string(),
    }
}

impl AppError {
    /// Stable machine-readable kind for clients.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::OutsideCheckInWindow { .. } => "outside_check_in_window",
            AppError::OutsideCheckOutWindow { .. } => "outside_check_out_window",
            AppError::OutOfRange(_) => "out_of_range",
            AppError::AlreadyCheckedIn(_) => "already_checked_in",
            AppError::AlreadyCheckedOut(_) => "already_checked_out",
            AppError::NotCheckedIn => "not_checked_in",
            AppError::OverlappingLeave { .. } => "overlapping_leave",
            AppError::NotFound(_) => "not_found",
            AppError::NotPending(_) => "not_pending",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Duplicate => "duplicate",
            AppError::Internal(_) | AppError::Database(_) => "internal",
        }
    }

    fn details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        match self {
            AppError::OutsideCheckInWindow { start_hour, end_hour } => {
                details.insert("start_hour".into(), json!(start_hour));
                details.insert("end_hour".into(), json!(end_hour));
            }
            AppError::OutsideCheckOutWindow { start_hour } => {
                details.insert("start_hour".into(), json!(start_hour));
            }
            AppError::OutOfRange(Some(nearest)) => {
                details.insert("location".into(), json!(nearest.name));
                details.insert("radius".into(), json!(nearest.radius));
                details.insert("distance_meters".into(), json!(nearest.distance_meters.round()));
            }
            AppError::AlreadyCheckedIn(record) | AppError::AlreadyCheckedOut(record) => {
                details.insert("record".into(), json!(record));
            }
            AppError::OverlappingLeave { existing_id } => {
                details.insert("existing_id".into(), json!(existing_id));
            }
            _ => {}
        }
        details
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::NotCheckedIn => StatusCode::BAD_REQUEST,
            AppError::OutsideCheckInWindow { .. }
            | AppError::OutsideCheckOutWindow { .. }
            | AppError::OutOfRange(_)
            | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::AlreadyCheckedIn(_)
            | AppError::AlreadyCheckedOut(_)
            | AppError::OverlappingLeave { .. }
            | AppError::NotPending(_)
            | AppError::Duplicate => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Internal Server Error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = self.details();
        body.insert("success".into(), json!(false));
        body.insert("error".into(), json!(self.kind()));
        body.insert("message".into(), json!(message));

        HttpResponse::build(self.status_code()).json(Value::Object(body))
    }
}

/// True when storage rejected a write because of a unique index.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::OutOfRange(None).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotPending(LeaveStatus::Approved).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound("Leave request".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_out_of_range_message_names_nearest() {
        let err = AppError::OutOfRange(Some(NearestLocation {
            name: "HQ".into(),
            radius: 100,
            distance_meters: 200.4,
        }));
        assert_eq!(err.to_string(), "You are 200m from HQ; marking requires being within 100m");
        let details = err.details();
        assert_eq!(details["location"], "HQ");
        assert_eq!(details["distance_meters"], 200.0);
    }

    #[test]
    fn test_window_message_carries_hours() {
        let err = AppError::OutsideCheckInWindow { start_hour: 10, end_hour: 11 };
        assert_eq!(err.to_string(), "Check-in is only allowed between 10:00 and 11:00");
        assert_eq!(err.kind(), "outside_check_in_window");
    }
}
