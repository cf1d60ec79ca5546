use axum::{routing::get, Router};

use appointment_cell::router::{appointment_routes, medical_record_routes};
use client_cell::router::client_routes;
use shared_database::AppState;
use veterinarian_cell::router::veterinarian_routes;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Vet Clinic API is running!" }))
        .nest("/veterinarians", veterinarian_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .merge(client_routes(state.clone()))
        .merge(medical_record_routes(state))
}
