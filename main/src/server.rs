use api_router::{api_routes_v1, api_state::ApiState};
use axum::{extract::FromRef, Router};
use common::{
    storage::workspaces::WorkspaceService,
    utils::config::{get_config, AppConfig},
};
use html_router::{html_routes, html_state::HtmlState};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config
    let config = get_config()?;
    let workspaces = WorkspaceService::from_config(&config);
    info!(
        workspace_root = %workspaces.root().display(),
        global_db = %config.global_db_path().display(),
        "Reading editor storage"
    );
    if !workspaces.root_exists() {
        warn!("Workspace storage root does not exist; listings will be empty");
    }

    let app = build_app(&config, workspaces);

    let serve_address = format!("{}:{}", config.http_host, config.http_port);
    info!("Starting server listening on {serve_address}");
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_app(config: &AppConfig, workspaces: WorkspaceService) -> Router {
    let api_state = ApiState {
        workspaces: workspaces.clone(),
    };
    let html_state = HtmlState::new_with_resources(workspaces, config.clone(), None);

    Router::new()
        .nest("/api/v1", api_routes_v1())
        .merge(html_routes(&html_state))
        .with_state(AppState {
            api_state,
            html_state,
        })
}

#[derive(Clone, FromRef)]
struct AppState {
    api_state: ApiState,
    html_state: HtmlState,
}
