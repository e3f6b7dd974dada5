use crate::{dto::HealthResponse, state::AppState};
use axum::extract::State;
use axum::Json;
use tracing::{debug, instrument};

#[instrument(skip(state), name = "api_health_check")]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    debug!("health check requested");
    Json(HealthResponse {
        status: "ok",
        uptime: state.statistics.snapshot().uptime_secs,
        pid: std::process::id(),
    })
}
