use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] chairside_service::error::ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] chairside_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] chairside_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
