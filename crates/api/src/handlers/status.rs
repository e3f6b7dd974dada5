use crate::{dto::StatusResponse, state::AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, instrument};

#[instrument(skip(state), name = "api_get_status")]
pub async fn get_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, StatusCode> {
    match state.get_status.execute().await {
        Ok(report) => Ok(Json(StatusResponse {
            is_running: report.is_running,
            is_blocking: report.is_blocking,
            domains_in_list: report.domains_in_list,
            queries_seen: report.queries_seen,
            queries_blocked: report.queries_blocked,
            queries_allowed: report.queries_allowed,
            blocking_method: report.blocking_method,
            uptime: report.uptime_secs,
        })),
        Err(err) => {
            error!(error = %err, "failed to read status");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
