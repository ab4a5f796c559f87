use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::api_state::ApiState;

/// Conversations across all workspaces, newest first.
pub async fn list_logs(State(state): State<ApiState>) -> impl IntoResponse {
    match state.workspaces.collect_logs().await {
        Ok(logs) => (StatusCode::OK, Json(json!({ "logs": logs }))),
        Err(err) => {
            error!("Failed to get logs: {err:?}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to get logs", "logs": [] })),
            )
        }
    }
}
