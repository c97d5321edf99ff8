use crate::api::attendance::{
    AttendanceListQuery, AttendanceListResponse, Coordinates, MarkAttendance,
};
use crate::api::leave_request::{LeaveListQuery, LeaveListResponse, ReviewLeave};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, LocationSnapshot, MarkAction};
use crate::model::attendance_location::AttendanceLocation;
use crate::model::attendance_settings::{AttendanceSettings, SettingsUpdate};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveSummary, LeaveType};
use crate::service::attendance::MarkOutcome;
use crate::service::leave::LeaveInput;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time & Presence API",
        version = "1.0.0",
        description = r#"
## Time & Presence

Geofenced attendance and leave requests for the HRMS back office.

### Attendance
- Check in and check out once per local calendar day
- Positions are matched against the active office locations
- Check-in and check-out are only accepted inside the configured hour windows

### Leave
- Employees submit leave for an inclusive date range
- HR/Admin approve or reject pending requests

### Security
Every endpoint expects a **JWT Bearer** access token issued by the identity service.
Settings changes are **Admin** only; reviews and cross-employee views are **HR/Admin** only.
"#,
    ),
    paths(
        crate::api::attendance::mark_attendance,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today,
        crate::api::attendance::list_attendance,
        crate::api::attendance::list_locations,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,
        crate::api::settings::reload_settings,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::my_leave_summary,
        crate::api::leave_request::leave_summary
    ),
    components(
        schemas(
            MarkAttendance,
            MarkOutcome,
            MarkAction,
            Coordinates,
            AttendanceStatus,
            AttendanceRecord,
            LocationSnapshot,
            AttendanceListQuery,
            AttendanceListResponse,
            AttendanceLocation,
            AttendanceSettings,
            SettingsUpdate,
            LeaveInput,
            LeaveType,
            LeaveStatus,
            LeaveRequest,
            LeaveSummary,
            LeaveListQuery,
            LeaveListResponse,
            ReviewLeave
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Geofenced check-in and check-out"),
        (name = "Attendance Settings", description = "Attendance time windows"),
        (name = "Leave", description = "Leave requests and reviews"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_presence_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/attendance/mark",
            "/api/attendance/settings",
            "/api/leave/{id}",
            "/api/leave/{id}/approve",
            "/api/leave/{id}/reject",
            "/api/leave/summary/{employee_id}",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {expected}");
        }
        // path parameters carry the same names as the registered routes
        assert!(!paths.iter().any(|p| p.contains("{leave_id}")));
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
