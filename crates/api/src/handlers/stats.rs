use crate::{dto::StatsResponse, state::AppState};
use axum::extract::State;
use axum::Json;
use tracing::{debug, instrument};

#[instrument(skip(state), name = "api_get_stats")]
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.get_stats.execute();
    debug!(seen = snapshot.queries_seen, blocked = snapshot.queries_blocked, "statistics retrieved");
    Json(StatsResponse {
        queries_seen: snapshot.queries_seen,
        queries_blocked: snapshot.queries_blocked,
        queries_allowed: snapshot.queries_allowed,
        forward_errors: snapshot.forward_errors,
        uptime_secs: snapshot.uptime_secs,
    })
}
