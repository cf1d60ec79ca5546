// libs/veterinarian-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::CreateAvailabilityRuleRequest;

use crate::models::{RegisterVeterinarianRequest, SlotsQuery, SlotsResponse};
use crate::services::{AvailabilityService, VeterinarianService};

// ==============================================================================
// DIRECTORY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_veterinarians(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = VeterinarianService::new(&state);
    let veterinarians = service.list().await?;

    Ok(Json(json!({
        "veterinarians": veterinarians,
        "total": veterinarians.len()
    })))
}

#[axum::debug_handler]
pub async fn register_veterinarian(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<RegisterVeterinarianRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = VeterinarianService::new(&state);
    let vet = service.register(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(json!(vet))))
}

#[axum::debug_handler]
pub async fn get_veterinarian(
    State(state): State<AppState>,
    Path(vet_id): Path<Uuid>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = VeterinarianService::new(&state);
    let vet = service.get(vet_id).await?;

    Ok(Json(json!(vet)))
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_availability(
    State(state): State<AppState>,
    Path(vet_id): Path<Uuid>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let rules = service.list_rules(vet_id).await?;

    Ok(Json(json!({
        "vet_id": vet_id,
        "rules": rules
    })))
}

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<AppState>,
    Path(vet_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAvailabilityRuleRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AvailabilityService::new(&state);
    let rule = service.create_rule(vet_id, user.id, request).await?;

    Ok((StatusCode::CREATED, Json(json!(rule))))
}

#[axum::debug_handler]
pub async fn delete_availability(
    State(state): State<AppState>,
    Path((vet_id, rule_id)): Path<(Uuid, Uuid)>,
    Extension(user): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    let service = AvailabilityService::new(&state);
    service.delete_rule(vet_id, rule_id, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Resolved bookable slots for one date.
#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<AppState>,
    Path(vet_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<SlotsResponse>, AppError> {
    let service = AvailabilityService::new(&state);
    let slots = service.resolve_slots(vet_id, query.date).await?;

    Ok(Json(SlotsResponse {
        vet_id,
        date: query.date,
        slots,
    }))
}
