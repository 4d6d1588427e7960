use diesel::{pg::Pg, prelude::*};

use chairside_core::error::CoreResult;
use chairside_core::slot::TimeSlot;

use crate::db::{enums::AppointmentStatus, schema};

/// A booked visit holding a provider and optionally a chair and a room for
/// its time window.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::appointment)]
#[diesel(check_for_backend(Pg))]
pub struct Appointment {
    pub id: uuid::Uuid,
    /// Tenant key; every lookup is scoped to one practice.
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: chrono::DateTime<chrono::Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Appointment {
    /// ## Summary
    /// The appointment's half-open time window.
    ///
    /// ## Errors
    /// Returns an invariant error if the stored interval is inverted; the
    /// schema CHECK makes that unreachable for rows written by this crate.
    pub fn slot(&self) -> CoreResult<TimeSlot> {
        TimeSlot::new(self.starts_at, self.ends_at)
    }
}

/// Insert struct for creating new appointments
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::appointment)]
pub struct NewAppointment {
    pub id: uuid::Uuid,
    pub practice_id: uuid::Uuid,
    pub patient_id: uuid::Uuid,
    pub provider_id: uuid::Uuid,
    pub chair_id: Option<uuid::Uuid>,
    pub room_id: Option<uuid::Uuid>,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: chrono::DateTime<chrono::Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}
