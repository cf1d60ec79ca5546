// libs/appointment-cell/src/router.rs
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Nested under `/appointments`.
pub fn appointment_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::list_appointments).post(handlers::book_appointment))
        .route("/agenda", get(handlers::get_vet_agenda))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/transition", post(handlers::transition_appointment))
        .route("/{appointment_id}/medical-record", post(handlers::create_medical_record))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}

/// Mounted at the root next to the pet routes.
pub fn medical_record_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/medical-records/{record_id}", put(handlers::update_medical_record))
        .route("/pets/{pet_id}/medical-records", get(handlers::list_pet_medical_records))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
