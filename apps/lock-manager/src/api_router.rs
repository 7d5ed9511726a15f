use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    let lock_routes = Router::new()
        .route("/locks/acquire", post(handlers::locks::acquire_lock_handler))
        .route("/locks/release", post(handlers::locks::release_locks_handler))
        .route("/locks/keep-alive", post(handlers::locks::keep_alive_handler))
        .route(
            "/locks/by-id/{lock_id}",
            get(handlers::locks::describe_lock_handler),
        );

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(lock_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
