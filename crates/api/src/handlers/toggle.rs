use crate::{
    dto::{ErrorResponse, ToggleRequest, ToggleResponse},
    state::AppState,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sentinel_dns_application::LifecycleError;
use tracing::{error, instrument};

#[instrument(skip(state), name = "api_toggle")]
pub async fn toggle(
    State(state): State<AppState>,
    Json(request): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.toggle.execute(request.enable).await {
        Ok(new_state) => Ok(Json(ToggleResponse {
            is_blocking: new_state.is_blocking,
        })),
        Err(err @ LifecycleError::NoOp(_)) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )),
        Err(err) => {
            error!(error = %err, "toggle failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: err.to_string(),
                }),
            ))
        }
    }
}
