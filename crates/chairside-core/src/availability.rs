//! Value types for availability checks and booking conflicts.

use serde::Serialize;
use uuid::Uuid;

use crate::slot::TimeSlot;
use crate::types::ResourceKind;

/// A proposed appointment window to check against existing bookings.
///
/// The provider is always checked; chair and room only when present. When
/// `exclude_appointment` is set, that appointment is ignored by every lookup
/// so an existing booking can be re-validated while it is being edited.
#[derive(Debug, Clone)]
pub struct AvailabilityRequest {
    pub provider_id: Uuid,
    pub chair_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub slot: TimeSlot,
    pub exclude_appointment: Option<Uuid>,
}

impl AvailabilityRequest {
    #[must_use]
    pub const fn new(provider_id: Uuid, slot: TimeSlot) -> Self {
        Self {
            provider_id,
            chair_id: None,
            room_id: None,
            slot,
            exclude_appointment: None,
        }
    }

    #[must_use]
    pub const fn with_chair(mut self, chair_id: Uuid) -> Self {
        self.chair_id = Some(chair_id);
        self
    }

    #[must_use]
    pub const fn with_room(mut self, room_id: Uuid) -> Self {
        self.room_id = Some(room_id);
        self
    }

    #[must_use]
    pub const fn excluding(mut self, appointment_id: Uuid) -> Self {
        self.exclude_appointment = Some(appointment_id);
        self
    }
}

/// An existing appointment whose interval intersects a proposed window for
/// the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub resource: ResourceKind,
    pub appointment_id: Uuid,
    pub slot: TimeSlot,
    pub description: String,
}

impl Conflict {
    #[must_use]
    pub fn new(resource: ResourceKind, appointment_id: Uuid, slot: TimeSlot) -> Self {
        let description = format!(
            "{resource} already booked by appointment {appointment_id} from {} to {}",
            slot.start(),
            slot.end()
        );
        Self {
            resource,
            appointment_id,
            slot,
            description,
        }
    }
}

/// Outcome of an availability check: available iff no conflicts were found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Availability {
    pub conflicts: Vec<Conflict>,
}

impl Availability {
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.conflicts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn slot() -> TimeSlot {
        TimeSlot::new(
            Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, 10, 30, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn empty_conflict_set_means_available() {
        let availability = Availability::default();
        assert!(availability.is_available());

        let availability = Availability {
            conflicts: vec![Conflict::new(ResourceKind::Provider, Uuid::now_v7(), slot())],
        };
        assert!(!availability.is_available());
    }

    #[test]
    fn conflict_description_names_the_resource() {
        let conflict = Conflict::new(ResourceKind::Chair, Uuid::now_v7(), slot());
        assert!(conflict.description.starts_with("chair already booked"));
    }

    #[test]
    fn request_builder_populates_optional_resources() {
        let chair = Uuid::now_v7();
        let room = Uuid::now_v7();
        let editing = Uuid::now_v7();

        let request = AvailabilityRequest::new(Uuid::now_v7(), slot())
            .with_chair(chair)
            .with_room(room)
            .excluding(editing);

        assert_eq!(request.chair_id, Some(chair));
        assert_eq!(request.room_id, Some(room));
        assert_eq!(request.exclude_appointment, Some(editing));
    }
}
