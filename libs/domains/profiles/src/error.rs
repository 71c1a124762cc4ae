use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid page size: {0}")]
    InvalidPageSize(usize),

    /// The backing store could not be reached or returned an error
    #[error("Profile store unavailable: {0}")]
    Unavailable(String),
}

pub type ProfileResult<T> = Result<T, ProfileError>;

impl From<sea_orm::DbErr> for ProfileError {
    fn from(err: sea_orm::DbErr) -> Self {
        ProfileError::Unavailable(format!("Database error: {}", err))
    }
}

impl From<database::DatabaseError> for ProfileError {
    fn from(err: database::DatabaseError) -> Self {
        ProfileError::Unavailable(err.to_string())
    }
}
