// libs/veterinarian-cell/src/router.rs
use axum::{
    middleware,
    routing::{delete, get},
    Router,
};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn veterinarian_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::list_veterinarians).post(handlers::register_veterinarian))
        .route("/{vet_id}", get(handlers::get_veterinarian))
        .route(
            "/{vet_id}/availability",
            get(handlers::list_availability).post(handlers::create_availability),
        )
        .route("/{vet_id}/availability/{rule_id}", delete(handlers::delete_availability))
        .route("/{vet_id}/slots", get(handlers::get_available_slots))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
