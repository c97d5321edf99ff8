use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A geofence employees may mark attendance from. Administered elsewhere;
/// this service only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceLocation {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "HQ")]
    pub name: String,
    #[schema(example = "Connaught Place, New Delhi", nullable = true)]
    pub address: Option<String>,
    #[schema(example = 28.6139)]
    pub latitude: f64,
    #[schema(example = 77.209)]
    pub longitude: f64,
    /// Allowed distance from the point, in meters
    #[schema(example = 100)]
    pub radius: u32,
    pub is_active: bool,
}
