use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use common::storage::types::workspace_log::WorkspaceLog;

use crate::{
    html_state::HtmlState,
    middlewares::response_middleware::{HtmlError, TemplateResponse},
    utils::pagination::{paginate_items, Pagination},
};

#[derive(Debug, Default, Deserialize)]
pub struct LogsParams {
    page: Option<usize>,
}

#[derive(Serialize)]
pub struct LogsPageData {
    logs: Vec<WorkspaceLog>,
    pagination: Pagination,
}

pub async fn show_logs(
    State(state): State<HtmlState>,
    Query(params): Query<LogsParams>,
) -> Result<impl IntoResponse, HtmlError> {
    let logs = state.workspaces.collect_logs().await?;
    let (logs, pagination) = paginate_items(logs, params.page, state.config.logs_per_page);

    Ok(TemplateResponse::new_template(
        "logs/index.html",
        LogsPageData { logs, pagination },
    ))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{get_page, state_for};
    use axum::http::StatusCode;
    use common::test_utils::WorkspaceFixture;
    use serde_json::json;

    fn chat_tabs(count: usize) -> serde_json::Value {
        let tabs: Vec<_> = (0..count)
            .map(|i| {
                json!({
                    "tabId": format!("tab-{i:02}"),
                    "chatTitle": format!("Question {i:02}"),
                    "lastSendTime": 1_700_000_000_000_i64 + i as i64 * 1000,
                    "bubbles": [{ "type": "user", "text": "hi" }]
                })
            })
            .collect();
        json!({ "tabs": tabs })
    }

    #[tokio::test]
    async fn lists_logs_newest_first_with_pages() {
        let fixture = WorkspaceFixture::new().expect("fixture");
        fixture
            .add_workspace(
                "ws1",
                &[("workbench.panel.aichat.view.aichat.chatdata", chat_tabs(30))],
            )
            .expect("workspace");
        assert_eq!(state_for(&fixture).config.logs_per_page, 25);

        let (status, _, first) = get_page(&fixture, "/logs", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(first.contains("Question 29"));
        assert!(first.contains("Question 05"));
        assert!(!first.contains("Question 04"));
        assert!(first.find("Question 29") < first.find("Question 28"));
        assert!(first.contains("?page=2"));

        let (status, _, second) = get_page(&fixture, "/logs?page=2", false).await;
        assert_eq!(status, StatusCode::OK);
        assert!(second.contains("Question 04"));
        assert!(second.contains("Question 00"));
        assert!(!second.contains("Question 05"));
    }

    #[tokio::test]
    async fn empty_storage_shows_no_logs() {
        let fixture = WorkspaceFixture::new().expect("fixture");

        let (status, _, body) = get_page(&fixture, "/logs", false).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No conversations found"));
    }
}
