use serde::{Deserialize, Serialize};

use shared_models::error::AppError;
use shared_models::{StorageError, UserRole, ValidationError};

/// Profile for the authenticated caller. The id always comes from the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterProfileRequest {
    pub name: String,
    /// Defaults to the email carried by the token.
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Maps the token's role claim onto a clinic role. Anything unrecognised,
/// including Supabase's generic `authenticated`, is a client.
pub fn role_from_claim(claim: Option<&str>) -> UserRole {
    claim
        .and_then(|raw| serde_json::from_value(serde_json::Value::String(raw.to_string())).ok())
        .unwrap_or(UserRole::Client)
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Profile already exists")]
    ProfileExists,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Pet not found")]
    PetNotFound,

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Validation(e) => AppError::ValidationError(e.to_string()),
            ClientError::ProfileExists => AppError::Conflict(err.to_string()),
            ClientError::ProfileNotFound | ClientError::PetNotFound => AppError::NotFound(err.to_string()),
            ClientError::Forbidden(msg) => AppError::Forbidden(msg),
            ClientError::Storage(e) => AppError::Database(e.to_string()),
        }
    }
}
