use crate::middleware::loopback_only;
use crate::state::AppState;
use crate::{handlers, handlers::toggle};
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

/// Builds the Control Interface router (§4.5): `/health`, `/status`,
/// `/toggle`, `/stats`. The caller is responsible for binding this to
/// `127.0.0.1` only and serving with `into_make_service_with_connect_info`
/// so the loopback guard below has a peer address to check.
pub fn create_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::get_status))
        .route("/stats", get(handlers::get_stats))
        .route("/toggle", post(toggle::toggle))
        .route_layer(middleware::from_fn(loopback_only))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
