use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use chairside_core::availability::{AvailabilityRequest, Conflict};
use chairside_core::slot::TimeSlot;
use chairside_service::scheduling::availability::check_availability;

use super::{ErrorResponse, render_service_error};
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Availability check request payload
#[derive(Debug, Deserialize)]
pub struct AvailabilityCheckRequest {
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
    pub exclude_appointment_id: Option<uuid::Uuid>,
}

/// ## Summary
/// Availability check response payload
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub is_available: bool,
    pub conflicts: Vec<Conflict>,
}

/// ## Summary
/// POST /api/availability/check - Report whether a window is free on every
/// requested resource.
///
/// This is an advisory read: booking re-validates at insert time against the
/// schema's exclusion constraints.
///
/// ## Errors
/// Returns HTTP 400 if the body is malformed or the window is inverted
/// Returns HTTP 500 if database operations fail
#[handler]
async fn check_availability_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing availability check request");

    let check_req: AvailabilityCheckRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse availability check request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    let slot = match TimeSlot::new(check_req.start, check_req.end) {
        Ok(s) => s,
        Err(e) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: e.to_string(),
            }));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    let request = AvailabilityRequest {
        provider_id: check_req.provider_id,
        chair_id: check_req.chair_id,
        room_id: check_req.room_id,
        slot,
        exclude_appointment: check_req.exclude_appointment_id,
    };

    match check_availability(&mut conn, &request).await {
        Ok(availability) => {
            res.render(Json(AvailabilityResponse {
                is_available: availability.is_available(),
                conflicts: availability.conflicts,
            }));
        }
        Err(e) => render_service_error(res, e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("availability").push(Router::with_path("check").post(check_availability_handler))
}
