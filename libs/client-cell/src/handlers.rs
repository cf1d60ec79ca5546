// libs/client-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::{ContactUpdate, CreatePetRequest, UpdatePetRequest};

use crate::models::RegisterProfileRequest;
use crate::services::{PetService, ProfileService};

// ==============================================================================
// PROFILE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn register_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RegisterProfileRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = ProfileService::new(&state);
    let profile = service.register(&user, request).await?;

    Ok((StatusCode::CREATED, Json(json!(profile))))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = ProfileService::new(&state);
    let profile = service.get(user.id).await?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ContactUpdate>,
) -> Result<Json<Value>, AppError> {
    let service = ProfileService::new(&state);
    let profile = service.update_contact(user.id, update).await?;

    Ok(Json(json!(profile)))
}

// ==============================================================================
// PET HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_pets(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&state);
    let pets = service.list_pets_for_owner(user.id).await?;

    Ok(Json(json!({
        "pets": pets,
        "total": pets.len()
    })))
}

#[axum::debug_handler]
pub async fn create_pet(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreatePetRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PetService::new(&state);
    let pet = service.create_pet(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(json!(pet))))
}

#[axum::debug_handler]
pub async fn get_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&state);
    let pet = service.get_pet(pet_id, user.id).await?;

    Ok(Json(json!(pet)))
}

#[axum::debug_handler]
pub async fn update_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdatePetRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PetService::new(&state);
    let pet = service.update_pet(pet_id, user.id, request).await?;

    Ok(Json(json!(pet)))
}
