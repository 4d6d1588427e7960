use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use chairside_service::scheduling::series::{materialize_occurrence, skip_occurrence};

use super::appointments::AppointmentResponse;
use super::series::OccurrenceResponse;
use super::{ErrorResponse, render_service_error};
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Materialize occurrence request payload
#[derive(Debug, Deserialize)]
pub struct MaterializeRequest {
    pub duration_minutes: u32,
    pub notes: Option<String>,
}

/// ## Summary
/// Materialize occurrence response payload
#[derive(Debug, Serialize)]
pub struct MaterializeResponse {
    pub occurrence: OccurrenceResponse,
    pub appointment: AppointmentResponse,
}

/// ## Summary
/// POST /`api/occurrences/:occurrence_id/materialize` - Book an appointment
/// for a pending occurrence through the regular booking path.
///
/// ## Errors
/// Returns HTTP 400 if the body is malformed, the duration is zero, or the
/// occurrence is no longer pending
/// Returns HTTP 404 if the occurrence does not exist
/// Returns HTTP 409 with the conflicting appointments if the window is taken
/// Returns HTTP 500 if database operations fail
#[handler]
async fn materialize_occurrence_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing materialize occurrence request");

    let Some(occurrence_id) = req.param::<uuid::Uuid>("occurrence_id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid occurrence ID".to_string(),
        }));
        return;
    };

    let materialize_req: MaterializeRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse materialize request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
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

    let duration = chrono::TimeDelta::minutes(i64::from(materialize_req.duration_minutes));

    match materialize_occurrence(&mut conn, occurrence_id, duration, materialize_req.notes).await {
        Ok((occurrence, appointment)) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(MaterializeResponse {
                occurrence: OccurrenceResponse::from(&occurrence),
                appointment: AppointmentResponse::from(appointment),
            }));
        }
        Err(e) => render_service_error(res, e),
    }
}

/// ## Summary
/// POST /`api/occurrences/:occurrence_id/skip` - Mark a pending occurrence
/// skipped without booking it.
///
/// ## Errors
/// Returns HTTP 404 if no pending occurrence with that id exists
/// Returns HTTP 500 if database operations fail
#[handler]
async fn skip_occurrence_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing skip occurrence request");

    let Some(occurrence_id) = req.param::<uuid::Uuid>("occurrence_id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid occurrence ID".to_string(),
        }));
        return;
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

    match skip_occurrence(&mut conn, occurrence_id).await {
        Ok(occurrence) => {
            res.render(Json(OccurrenceResponse::from(&occurrence)));
        }
        Err(e) => render_service_error(res, e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("occurrences").push(
        Router::with_path("<occurrence_id>")
            .push(Router::with_path("materialize").post(materialize_occurrence_handler))
            .push(Router::with_path("skip").post(skip_occurrence_handler)),
    )
}
