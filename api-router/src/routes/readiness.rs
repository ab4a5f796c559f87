use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness check: returns 200 if the workspace storage root is readable, else 503.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    if state.workspaces.root_exists() {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "workspace_root": "ok" }
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "workspace_root": "fail" },
                "reason": format!(
                    "Workspace path does not exist: {}",
                    state.workspaces.root().display()
                )
            })),
        )
    }
}
