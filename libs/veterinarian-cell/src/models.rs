use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::{StorageError, TimeSlot, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterVeterinarianRequest {
    /// Existing user with the veterinarian role.
    pub user_id: Uuid,
    pub specialty: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub vet_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Veterinarian not found")]
    VeterinarianNotFound,

    #[error("Availability rule not found")]
    RuleNotFound,

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Validation(e) => AppError::ValidationError(e.to_string()),
            AvailabilityError::VeterinarianNotFound | AvailabilityError::RuleNotFound => {
                AppError::NotFound(err.to_string())
            }
            AvailabilityError::Forbidden(msg) => AppError::Forbidden(msg),
            AvailabilityError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}
