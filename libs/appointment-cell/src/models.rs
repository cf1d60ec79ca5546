// libs/appointment-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::{AppointmentFilter, AppointmentStatus, SlotKey, StorageError, ValidationError};
use veterinarian_cell::AvailabilityError;

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Booking request. The client is always the authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub vet_id: Uuid,
    pub pet_id: Uuid,
    pub date: NaiveDate,
    /// `HH:MM`
    pub time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentQueryParams {
    pub client_id: Option<Uuid>,
    pub vet_id: Option<Uuid>,
    pub pet_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl From<AppointmentQueryParams> for AppointmentFilter {
    fn from(params: AppointmentQueryParams) -> Self {
        AppointmentFilter {
            client_id: params.client_id,
            vet_id: params.vet_id,
            pet_id: params.pet_id,
            status: params.status,
            date_from: params.date_from,
            date_to: params.date_to,
        }
    }
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Slot {0} is already booked")]
    SlotConflict(SlotKey),

    #[error("Slot {0} is outside the veterinarian's availability")]
    SlotUnavailable(SlotKey),

    #[error("Illegal transition: {0}")]
    IllegalTransition(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Appointment already has a medical record")]
    MedicalRecordExists,

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<AvailabilityError> for AppointmentError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::Validation(e) => AppointmentError::Validation(e),
            AvailabilityError::VeterinarianNotFound => AppointmentError::NotFound("Veterinarian"),
            AvailabilityError::RuleNotFound => AppointmentError::NotFound("Availability rule"),
            AvailabilityError::Forbidden(msg) => AppointmentError::Forbidden(msg),
            AvailabilityError::Storage(e) => AppointmentError::Storage(e),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation(e) => AppError::ValidationError(e.to_string()),
            AppointmentError::SlotConflict(_) | AppointmentError::MedicalRecordExists => {
                AppError::Conflict(err.to_string())
            }
            AppointmentError::SlotUnavailable(_) => AppError::Unprocessable(err.to_string()),
            AppointmentError::IllegalTransition(_) => AppError::Forbidden(err.to_string()),
            AppointmentError::NotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::Forbidden(msg) => AppError::Forbidden(msg),
            AppointmentError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}
