use api_state::ApiState;
use axum::{extract::FromRef, routing::get, Router};
use routes::{
    liveness::live,
    logs::list_logs,
    readiness::ready,
    workspaces::{list_workspaces, workspace_tabs},
};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Health checks for process supervisors
    let health = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    let data = Router::new()
        .route("/workspaces", get(list_workspaces))
        .route("/workspaces/{id}/tabs", get(workspace_tabs))
        .route("/logs", get(list_logs));

    health.merge(data)
}
