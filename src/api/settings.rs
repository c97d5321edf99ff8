use crate::auth::auth::AuthUser;
use crate::error::AppResult;
use crate::model::attendance_settings::SettingsUpdate;
use crate::service::Services;
use actix_web::{HttpResponse, Responder, web};

/// Current check-in/check-out windows
#[utoipa::path(
    get,
    path = "/api/attendance/settings",
    responses(
        (status = 200, description = "Current window configuration", body = crate::model::attendance_settings::AttendanceSettings),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Settings"
)]
pub async fn get_settings(
    _auth: AuthUser,
    services: web::Data<Services>,
) -> AppResult<impl Responder> {
    Ok(HttpResponse::Ok().json(services.settings.current()))
}

/// Update some or all window hours (Admin)
#[utoipa::path(
    put,
    path = "/api/attendance/settings",
    request_body = SettingsUpdate,
    responses(
        (status = 200, description = "Settings updated", body = crate::model::attendance_settings::AttendanceSettings),
        (status = 400, description = "Empty update or hour outside 0-23", body = Object, example = json!({
            "success": false,
            "error": "invalid_input",
            "message": "check_in_end_hour must be between 0 and 23, got 24"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    services: web::Data<Services>,
    payload: web::Json<SettingsUpdate>,
) -> AppResult<impl Responder> {
    auth.require_admin()?;

    tracing::info!(admin = auth.user_id, "Updating attendance settings");
    let settings = services.settings.update(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(settings))
}

/// Re-read settings from storage (Admin)
#[utoipa::path(
    post,
    path = "/api/attendance/settings/reload",
    responses(
        (status = 200, description = "Settings reloaded", body = crate::model::attendance_settings::AttendanceSettings),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance Settings"
)]
pub async fn reload_settings(
    auth: AuthUser,
    services: web::Data<Services>,
) -> AppResult<impl Responder> {
    auth.require_admin()?;
    let settings = services.settings.reload().await?;
    Ok(HttpResponse::Ok().json(settings))
}
