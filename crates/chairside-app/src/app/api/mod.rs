mod appointments;
mod availability;
mod healthcheck;
mod occurrences;
mod series;

use salvo::{Response, http::StatusCode, writing::Json};
use serde::Serialize;
use tracing::error;

use chairside_core::error::CoreError;
use chairside_service::error::ServiceError;

// Re-export route constants from core
pub use chairside_core::constants::{API_ROUTE_COMPONENT, API_ROUTE_PREFIX};

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// ## Summary
/// Conflict response payload for rejected bookings
#[derive(Debug, Serialize)]
pub struct ConflictResponse {
    pub error: String,
    pub conflicts: Vec<chairside_core::availability::Conflict>,
}

/// ## Summary
/// Renders a service error with the status code its class maps to:
/// 409 for taken slots, 404 for missing records, 400 for rejected input,
/// 500 otherwise.
pub(crate) fn render_service_error(res: &mut Response, err: ServiceError) {
    match err {
        ServiceError::SlotUnavailable { conflicts } => {
            res.status_code(StatusCode::CONFLICT);
            res.render(Json(ConflictResponse {
                error: "Requested slot is unavailable".to_string(),
                conflicts,
            }));
        }
        ServiceError::NotFound(message) => {
            res.status_code(StatusCode::NOT_FOUND);
            res.render(Json(ErrorResponse { error: message }));
        }
        ServiceError::ValidationError(message)
        | ServiceError::CoreError(
            CoreError::ValidationError(message) | CoreError::InvalidInput(message),
        ) => {
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse { error: message }));
        }
        other => {
            error!(error = ?other, "Request failed");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
        }
    }
}

/// ## Summary
/// Constructs the main API router.
#[must_use]
pub fn routes() -> salvo::Router {
    salvo::Router::with_path(API_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(availability::routes())
        .push(appointments::routes())
        .push(series::routes())
        .push(occurrences::routes())
}
