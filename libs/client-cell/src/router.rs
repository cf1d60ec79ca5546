// libs/client-cell/src/router.rs
use axum::{middleware, routing::get, Router};

use shared_database::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Mounted at the root: owns `/clients/me` and `/pets`.
pub fn client_routes(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route(
            "/clients/me",
            get(handlers::get_profile)
                .post(handlers::register_profile)
                .put(handlers::update_contact),
        )
        .route("/pets", get(handlers::list_pets).post(handlers::create_pet))
        .route("/pets/{pet_id}", get(handlers::get_pet).put(handlers::update_pet))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
