pub mod handlers;

use axum::{extract::FromRef, routing::get, Router};
use handlers::show_workspace;

use crate::html_state::HtmlState;

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    Router::new().route("/workspace/{id}", get(show_workspace))
}
