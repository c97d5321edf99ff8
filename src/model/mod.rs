pub mod attendance;
pub mod attendance_location;
pub mod attendance_settings;
pub mod leave_request;
pub mod role;
