//! Response envelope pieces shared by the HTTP handlers.

use serde::Serialize;
use utoipa::ToSchema;

/// Marker carried by every successful JSON body.
///
/// Failure bodies carry `"status": "fail"` through the domain error type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SuccessStatus {
    #[default]
    Success,
}

/// Body with nothing but the success marker.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct StatusOnly {
    pub status: SuccessStatus,
}
