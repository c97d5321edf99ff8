use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::attendance::{AttendanceRecord, MarkAction};
use crate::service::Services;
use crate::service::attendance::{AttendanceQuery, MarkOutcome};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = 28.6139)]
    pub latitude: Option<f64>,
    #[schema(example = 77.209)]
    pub longitude: Option<f64>,
    #[schema(example = "check-in")]
    pub action: MarkAction,
}

#[derive(Deserialize, ToSchema)]
pub struct Coordinates {
    #[schema(example = 28.6139)]
    pub latitude: Option<f64>,
    #[schema(example = 77.209)]
    pub longitude: Option<f64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceListQuery {
    /// Filter by user (HR/Admin only; others always see their own records)
    #[schema(example = 42)]
    pub user_id: Option<u64>,
    /// Single local calendar day
    #[schema(example = "2026-03-10", format = "date", value_type = Option<String>)]
    pub date: Option<NaiveDate>,
    /// First local day of an inclusive range
    #[schema(example = "2026-03-01", format = "date", value_type = Option<String>)]
    pub from: Option<NaiveDate>,
    /// Last local day of an inclusive range
    #[schema(example = "2026-03-31", format = "date", value_type = Option<String>)]
    pub to: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 20)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 20)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

fn marked(action: MarkAction, outcome: MarkOutcome) -> HttpResponse {
    let message = match action {
        MarkAction::CheckIn => "Checked in successfully",
        MarkAction::CheckOut => "Checked out successfully",
    };
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "record": outcome.record,
        "location": outcome.location,
        "distance_meters": outcome.distance_meters,
        "work_hours": outcome.work_hours,
    }))
}

async fn mark(
    auth: &AuthUser,
    services: &Services,
    latitude: Option<f64>,
    longitude: Option<f64>,
    action: MarkAction,
) -> AppResult<HttpResponse> {
    let outcome = services
        .attendance
        .mark(auth.user_id, latitude, longitude, action, Utc::now())
        .await?;
    Ok(marked(action, outcome))
}

/// Mark attendance (check-in or check-out) from the caller's position
#[utoipa::path(
    post,
    path = "/api/attendance/mark",
    request_body = MarkAttendance,
    responses(
        (status = 200, description = "Attendance marked", body = MarkOutcome),
        (status = 400, description = "Missing coordinates or no check-in today", body = Object, example = json!({
            "success": false,
            "error": "not_checked_in",
            "message": "No check-in found for today"
        })),
        (status = 403, description = "Outside the allowed window or out of range", body = Object, example = json!({
            "success": false,
            "error": "out_of_range",
            "message": "You are 200m from HQ; marking requires being within 100m",
            "location": "HQ",
            "radius": 100,
            "distance_meters": 200.0
        })),
        (status = 409, description = "Already checked in/out today"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<MarkAttendance>,
) -> AppResult<impl Responder> {
    mark(&auth, &services, payload.latitude, payload.longitude, payload.action).await
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = Coordinates,
    responses(
        (status = 200, description = "Checked in successfully", body = MarkOutcome),
        (status = 409, description = "Already checked in today", body = Object, example = json!({
            "success": false,
            "error": "already_checked_in",
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Outside the check-in window or out of range"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<Coordinates>,
) -> AppResult<impl Responder> {
    mark(&auth, &services, payload.latitude, payload.longitude, MarkAction::CheckIn).await
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body = Coordinates,
    responses(
        (status = 200, description = "Checked out successfully", body = MarkOutcome),
        (status = 400, description = "No check-in found for today", body = Object, example = json!({
            "success": false,
            "error": "not_checked_in",
            "message": "No check-in found for today"
        })),
        (status = 409, description = "Already checked out today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Outside the check-out window or out of range"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<Coordinates>,
) -> AppResult<impl Responder> {
    mark(&auth, &services, payload.latitude, payload.longitude, MarkAction::CheckOut).await
}

/// The caller's attendance record for the current local day
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Today's record (`record` is null before check-in)", body = Object, example = json!({
            "record": null
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today(auth: AuthUser, services: web::Data<Services>) -> AppResult<impl Responder> {
    let record = services.attendance.today(auth.user_id, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(json!({ "record": record })))
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceListQuery),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    services: web::Data<Services>,
    query: web::Query<AttendanceListQuery>,
) -> AppResult<impl Responder> {
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let user_id = if auth.role.is_back_office() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    let (records, total) = services
        .attendance
        .list(&AttendanceQuery {
            user_id,
            date: query.date,
            from: query.from,
            to: query.to,
            limit: per_page,
            offset,
        })
        .await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

/// Active attendance locations
#[utoipa::path(
    get,
    path = "/api/attendance/locations",
    responses(
        (status = 200, description = "Active geofences", body = Vec<crate::model::attendance_location::AttendanceLocation>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_locations(
    _auth: AuthUser,
    services: web::Data<Services>,
) -> AppResult<impl Responder> {
    let locations = services.locations.active_locations().await?;
    Ok(HttpResponse::Ok().json(locations))
}
