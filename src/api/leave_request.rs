use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::leave_request::{LeaveFilter, LeaveRequest, LeaveStatus};
use crate::service::Services;
use crate::service::leave::LeaveInput;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveListQuery {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 3)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

#[derive(Deserialize, Default, ToSchema)]
pub struct ReviewLeave {
    #[schema(example = "Approved, enjoy", nullable = true)]
    pub note: Option<String>,
}

/* =========================
Create leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveInput,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully", body = LeaveRequest),
        (status = 400, description = "Missing field, bad date or end before start"),
        (status = 409, description = "Overlaps an existing pending/approved request", body = Object, example = json!({
            "success": false,
            "error": "overlapping_leave",
            "message": "Leave request overlaps an existing request (12)",
            "existing_id": 12
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<LeaveInput>,
) -> AppResult<impl Responder> {
    let employee_id = auth.require_employee()?;

    let request = services.leave.create(employee_id, payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Leave request submitted",
        "data": request
    })))
}

async fn review(
    auth: AuthUser,
    services: web::Data<Services>,
    leave_id: u64,
    status: LeaveStatus,
    payload: Option<web::Json<ReviewLeave>>,
) -> AppResult<HttpResponse> {
    auth.require_hr_or_admin()?;

    let note = payload.and_then(|p| p.into_inner().note);
    let request = services
        .leave
        .review(leave_id, auth.user_id, status, note, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Leave {}", status),
        "data": request
    })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{id}/approve",
    params(
        ("id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body(content = ReviewLeave, description = "Optional review note"),
    responses(
        (status = 200, description = "Leave approved successfully", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed", body = Object, example = json!({
            "success": false,
            "error": "not_pending",
            "message": "Only pending requests can be reviewed (current status: approved)"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    services: web::Data<Services>,
    path: web::Path<u64>,
    payload: Option<web::Json<ReviewLeave>>,
) -> AppResult<impl Responder> {
    review(auth, services, path.into_inner(), LeaveStatus::Approved, payload).await
}

/* =========================
Reject leave (HR/Admin)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{id}/reject",
    params(
        ("id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body(content = ReviewLeave, description = "Optional review note"),
    responses(
        (status = 200, description = "Leave rejected successfully", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    services: web::Data<Services>,
    path: web::Path<u64>,
    payload: Option<web::Json<ReviewLeave>>,
) -> AppResult<impl Responder> {
    review(auth, services, path.into_inner(), LeaveStatus::Rejected, payload).await
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(
        ("id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "success": false,
            "error": "not_found",
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    services: web::Data<Services>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let leave = services.leave.get(path.into_inner()).await?;

    if !auth.can_view_employee(leave.employee_id) {
        return Err(AppError::Forbidden("Not your leave request".into()));
    }

    Ok(HttpResponse::Ok().json(leave))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    services: web::Data<Services>,
    query: web::Query<LeaveListQuery>,
) -> AppResult<impl Responder> {
    auth.require_hr_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<LeaveStatus>()
                .map_err(|_| AppError::InvalidInput(format!("Unknown leave status '{s}'")))
        })
        .transpose()?;

    let (leaves, total) = services
        .leave
        .list(&LeaveFilter {
            employee_id: query.employee_id,
            status,
            limit: per_page,
            offset,
        })
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}

/// The caller's own leave summary
#[utoipa::path(
    get,
    path = "/api/leave/summary",
    responses(
        (status = 200, description = "Counts per status and approved days", body = crate::model::leave_request::LeaveSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_leave_summary(
    auth: AuthUser,
    services: web::Data<Services>,
) -> AppResult<impl Responder> {
    let employee_id = auth.require_employee()?;
    let summary = services.leave.summarize(employee_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// An employee's leave summary (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/leave/summary/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee whose requests are summarized")
    ),
    responses(
        (status = 200, description = "Counts per status and approved days", body = crate::model::leave_request::LeaveSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_summary(
    auth: AuthUser,
    services: web::Data<Services>,
    path: web::Path<u64>,
) -> AppResult<impl Responder> {
    let employee_id = path.into_inner();
    if !auth.can_view_employee(employee_id) {
        return Err(AppError::Forbidden("HR/Admin only".into()));
    }

    let summary = services.leave.summarize(employee_id).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::{SECRET, token};
    use crate::config::Config;
    use crate::models::TokenType;
    use crate::repository::Repository;
    use crate::repository::memory::{
        MemoryAttendanceRepository, MemoryLeaveRepository, MemoryLocationRepository,
        MemorySettingsRepository,
    };
    use actix_web::{App, http::StatusCode, test};
    use std::sync::Arc;

    async fn services() -> Services {
        let repository = Repository {
            attendance: Arc::new(MemoryAttendanceRepository::default()),
            leave: Arc::new(MemoryLeaveRepository::default()),
            locations: Arc::new(MemoryLocationRepository::default()),
            settings: Arc::new(MemorySettingsRepository::default()),
        };
        Services::new(repository, chrono_tz::Asia::Kolkata).await.unwrap()
    }

    #[actix_web::test]
    async fn test_submit_and_review_flow() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests(SECRET)))
                .app_data(web::Data::new(services().await))
                .route("/leave", web::post().to(create_leave))
                .route("/leave/summary", web::get().to(my_leave_summary))
                .route("/leave/{id}/approve", web::put().to(approve_leave)),
        )
        .await;
        let employee = format!("Bearer {}", token(5, 3, Some(1000), TokenType::Access));
        let hr = format!("Bearer {}", token(2, 2, None, TokenType::Access));

        let req = test::TestRequest::post()
            .uri("/leave")
            .insert_header(("Authorization", employee.clone()))
            .set_json(json!({
                "leave_type": "annual",
                "start_date": "2026-01-10",
                "end_date": "2026-01-12",
                "reason": "Trip"
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["total_days"], 3);
        let id = body["data"]["id"].as_u64().unwrap();

        // employees cannot review
        let req = test::TestRequest::put()
            .uri(&format!("/leave/{id}/approve"))
            .insert_header(("Authorization", employee.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put()
            .uri(&format!("/leave/{id}/approve"))
            .insert_header(("Authorization", hr.clone()))
            .set_json(json!({"note": "ok"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["status"], "approved");
        assert_eq!(body["data"]["reviewed_by"], 2);

        let req = test::TestRequest::put()
            .uri(&format!("/leave/{id}/approve"))
            .insert_header(("Authorization", hr))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::get()
            .uri("/leave/summary")
            .insert_header(("Authorization", employee))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["approved"], 1);
        assert_eq!(body["total_approved_days"], 3);
    }

    #[actix_web::test]
    async fn test_create_requires_employee_profile() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Config::for_tests(SECRET)))
                .app_data(web::Data::new(services().await))
                .route("/leave", web::post().to(create_leave)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/leave")
            .insert_header((
                "Authorization",
                format!("Bearer {}", token(9, 1, None, TokenType::Access)),
            ))
            .set_json(json!({
                "leave_type": "sick",
                "start_date": "2026-01-10",
                "end_date": "2026-01-10",
                "reason": "Flu"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
