pub mod auth;
pub mod chirps;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod profanity;
pub mod users;
pub mod webhooks;

use std::path::Path;

use axum::{
    Router, middleware as axum_middleware,
    routing::{any, delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::auth::AppState;
use crate::middleware::require_auth;

/// All routes. Tracing and CORS layers are left to the binary.
pub fn router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let public_routes = Router::new()
        .route("/api/healthz", get(metrics::healthz))
        .route("/api/reset", any(metrics::reset))
        .route("/admin/metrics", get(metrics::metrics_page))
        .route("/api/users", post(users::create_user))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        .route("/api/chirps", get(chirps::get_chirps))
        .route("/api/chirps/{chirp_id}", get(chirps::get_chirp))
        .route("/api/polka/webhooks", post(webhooks::polka));

    let protected_routes = Router::new()
        .route("/api/users", put(users::update_user))
        .route("/api/chirps", post(chirps::create_chirp))
        .route("/api/chirps/{chirp_id}", delete(chirps::delete_chirp))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    let static_routes = Router::new()
        .nest_service("/app", ServeDir::new(static_dir.as_ref()))
        .layer(axum_middleware::from_fn_with_state(state.clone(), metrics::count_hits));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(static_routes)
        .with_state(state)
}
