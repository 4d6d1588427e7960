use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use chairside_core::slot::TimeSlot;
use chairside_db::db::enums::AppointmentStatus;
use chairside_db::model::appointment::Appointment;
use chairside_service::scheduling::booking::{
    BookingRequest, book_appointment, cancel_appointment, reschedule_appointment,
};

use super::{ErrorResponse, render_service_error};
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Book appointment request payload
#[derive(Debug, Deserialize)]
pub struct BookAppointmentRequest {
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
    pub notes: Option<String>,
}

/// ## Summary
/// Reschedule request payload
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
}

/// ## Summary
/// Appointment response payload
#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub id: uuid::Uuid,
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub start: chrono::DateTime<chrono::Utc>,
    pub end: chrono::DateTime<chrono::Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            practice_id: appointment.practice_id,
            patient_id: appointment.patient_id,
            provider_id: appointment.provider_id,
            chair_id: appointment.chair_id,
            room_id: appointment.room_id,
            start: appointment.starts_at,
            end: appointment.ends_at,
            status: appointment.status,
            notes: appointment.notes,
        }
    }
}

/// ## Summary
/// POST /api/appointments - Book an appointment.
///
/// ## Errors
/// Returns HTTP 400 if the body is malformed or the window is inverted
/// Returns HTTP 409 with the conflicting appointments if a resource is taken
/// Returns HTTP 500 if database operations fail
#[handler]
async fn book_appointment_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing book appointment request");

    let book_req: BookAppointmentRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse book appointment request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    let slot = match TimeSlot::new(book_req.start, book_req.end) {
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

    let booking = BookingRequest {
        practice_id: book_req.practice_id,
        patient_id: book_req.patient_id,
        provider_id: book_req.provider_id,
        chair_id: book_req.chair_id,
        room_id: book_req.room_id,
        slot,
        notes: book_req.notes,
    };

    match book_appointment(&mut conn, &booking).await {
        Ok(appointment) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(AppointmentResponse::from(appointment)));
        }
        Err(e) => render_service_error(res, e),
    }
}

/// ## Summary
/// DELETE /`api/appointments/:appointment_id` - Cancel an appointment.
///
/// ## Errors
/// Returns HTTP 404 if no cancellable appointment with that id exists
/// Returns HTTP 500 if database operations fail
#[handler]
async fn cancel_appointment_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing cancel appointment request");

    let Some(appointment_id) = req.param::<uuid::Uuid>("appointment_id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid appointment ID".to_string(),
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

    match cancel_appointment(&mut conn, appointment_id).await {
        Ok(appointment) => {
            res.render(Json(AppointmentResponse::from(appointment)));
        }
        Err(e) => render_service_error(res, e),
    }
}

/// ## Summary
/// PUT /`api/appointments/:appointment_id/schedule` - Move an appointment to
/// a new window, excluding its own interval from the conflict check.
///
/// ## Errors
/// Returns HTTP 400 if the body is malformed or the window is inverted
/// Returns HTTP 404 if the appointment does not exist
/// Returns HTTP 409 with the conflicting appointments if the window is taken
/// Returns HTTP 500 if database operations fail
#[handler]
async fn reschedule_appointment_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing reschedule appointment request");

    let Some(appointment_id) = req.param::<uuid::Uuid>("appointment_id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid appointment ID".to_string(),
        }));
        return;
    };

    let reschedule_req: RescheduleRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse reschedule request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    let slot = match TimeSlot::new(reschedule_req.start, reschedule_req.end) {
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

    match reschedule_appointment(&mut conn, appointment_id, slot).await {
        Ok(appointment) => {
            res.render(Json(AppointmentResponse::from(appointment)));
        }
        Err(e) => render_service_error(res, e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("appointments")
        .post(book_appointment_handler)
        .push(
            Router::with_path("<appointment_id>")
                .delete(cancel_appointment_handler)
                .push(Router::with_path("schedule").put(reschedule_appointment_handler)),
        )
}
