use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
};
use common::test_utils::WorkspaceFixture;
use tower::ServiceExt;

use crate::{html_routes, html_state::HtmlState};

pub fn state_for(fixture: &WorkspaceFixture) -> HtmlState {
    HtmlState::new_with_resources(fixture.service(), fixture.config(), None)
}

/// Runs one GET through the full html router.
pub async fn get_page(
    fixture: &WorkspaceFixture,
    uri: &str,
    htmx: bool,
) -> (StatusCode, HeaderMap, String) {
    let state = state_for(fixture);
    let app = html_routes::<HtmlState>(&state).with_state(state);

    let mut request = Request::builder().uri(uri);
    if htmx {
        request = request.header("HX-Request", "true");
    }
    let response = app
        .oneshot(request.body(Body::empty()).expect("request"))
        .await
        .expect("response");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, headers, String::from_utf8_lossy(&bytes).into_owned())
}
