use thiserror::Error;

use chairside_core::availability::Conflict;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] chairside_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] chairside_core::error::CoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Requested slot is unavailable")]
    SlotUnavailable { conflicts: Vec<Conflict> },

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
