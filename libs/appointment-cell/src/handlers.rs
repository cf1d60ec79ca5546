// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::MedicalRecordFields;

use crate::models::{AppointmentQueryParams, CreateAppointmentRequest, TransitionRequest};
use crate::services::{AppointmentBookingService, AppointmentQueryService, MedicalRecordService};

#[derive(Debug, Deserialize)]
pub struct AgendaQuery {
    pub date: NaiveDate,
    /// Defaults to the caller.
    pub vet_id: Option<Uuid>,
}

// ==============================================================================
// BOOKING & LIFECYCLE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointment = service.create_appointment(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointment = service.get_appointment(appointment_id, user.id).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn transition_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&state);
    let appointment = service
        .transition_appointment(appointment_id, user.id, request.status)
        .await?;

    Ok(Json(json!(appointment)))
}

// ==============================================================================
// QUERY HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
    Query(params): Query<AppointmentQueryParams>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentQueryService::new(&state);
    let appointments = service.list_for_actor(user.id, params.into()).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_vet_agenda(
    State(state): State<AppState>,
    Query(query): Query<AgendaQuery>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let vet_id = query.vet_id.unwrap_or(user.id);
    let service = AppointmentQueryService::new(&state);
    let appointments = service.agenda_for(user.id, Some(vet_id), query.date).await?;

    Ok(Json(json!({
        "vet_id": vet_id,
        "date": query.date,
        "appointments": appointments
    })))
}

// ==============================================================================
// MEDICAL RECORD HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_medical_record(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(fields): Json<MedicalRecordFields>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = MedicalRecordService::new(&state);
    let record = service.create_medical_record(appointment_id, user.id, fields).await?;

    Ok((StatusCode::CREATED, Json(json!(record))))
}

#[axum::debug_handler]
pub async fn update_medical_record(
    State(state): State<AppState>,
    Path(record_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
    Json(fields): Json<MedicalRecordFields>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&state);
    let record = service.update_medical_record(record_id, user.id, fields).await?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn list_pet_medical_records(
    State(state): State<AppState>,
    Path(pet_id): Path<Uuid>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AppError> {
    let service = MedicalRecordService::new(&state);
    let records = service.medical_records_for_pet(pet_id, user.id).await?;

    Ok(Json(json!({
        "pet_id": pet_id,
        "records": records
    })))
}
