use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;

use common::storage::types::{
    chat_tab::{Bubble, ChatTab},
    composer::ComposerEntry,
};
use conversation_classifier::{classify_role, extract_content, RawMessage, Role};

use crate::{
    html_state::HtmlState,
    middlewares::response_middleware::{HtmlError, TemplateResponse},
};

#[derive(Debug, Serialize)]
pub struct BubbleView {
    role: Role,
    content: String,
}

impl From<Bubble> for BubbleView {
    fn from(bubble: Bubble) -> Self {
        match bubble {
            Bubble::Normalized(bubble) => Self {
                role: bubble.role,
                content: bubble.content,
            },
            Bubble::Raw(value) => {
                let message = RawMessage::new(value);
                // Chat panel bubbles mark the author with a string `type`.
                let role = match message.str_field("type") {
                    Some("ai") => Role::Assistant,
                    Some("user") => Role::User,
                    _ => classify_role(&message),
                };
                Self {
                    role,
                    content: extract_content(&message),
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TabView {
    id: String,
    title: String,
    timestamp: String,
    bubbles: Vec<BubbleView>,
}

impl From<ChatTab> for TabView {
    fn from(tab: ChatTab) -> Self {
        Self {
            id: tab.id,
            title: tab.title,
            timestamp: tab.timestamp,
            bubbles: tab.bubbles.into_iter().map(BubbleView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ComposerView {
    id: String,
    title: String,
    message_count: usize,
    updated_at: Option<i64>,
}

impl From<&ComposerEntry> for ComposerView {
    fn from(entry: &ComposerEntry) -> Self {
        Self {
            id: entry.id().to_string(),
            title: entry.title(),
            message_count: entry.message_count(),
            updated_at: entry.updated_millis(),
        }
    }
}

#[derive(Serialize)]
pub struct WorkspacePageData {
    workspace_id: String,
    tabs: Vec<TabView>,
    composers: Vec<ComposerView>,
}

pub async fn show_workspace(
    State(state): State<HtmlState>,
    Path(workspace_id): Path<String>,
) -> Result<impl IntoResponse, HtmlError> {
    let data = state.workspaces.workspace_tabs(&workspace_id).await?;

    let composers = data
        .composers
        .as_ref()
        .map(|composers| composers.all_composers.iter().map(ComposerView::from).collect())
        .unwrap_or_default();

    Ok(TemplateResponse::new_template(
        "workspace/detail.html",
        WorkspacePageData {
            workspace_id,
            tabs: data.tabs.into_iter().map(TabView::from).collect(),
            composers,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::get_page;
    use axum::http::StatusCode;
    use common::test_utils::WorkspaceFixture;
    use serde_json::json;

    #[test]
    fn raw_panel_bubbles_are_read_like_messages() {
        let view = BubbleView::from(Bubble::Raw(json!({ "type": "ai", "text": " Sure thing " })));
        assert_eq!(view.role, Role::Assistant);
        assert_eq!(view.content, "Sure thing");
    }

    #[tokio::test]
    async fn renders_tabs_and_remaining_composers() {
        let fixture = WorkspaceFixture::new().expect("fixture");
        fixture
            .add_workspace(
                "ws1",
                &[
                    (
                        "workbench.panel.aichat.view.aichat.chatdata",
                        json!({ "tabs": [{
                            "tabId": "tab-1",
                            "chatTitle": "Why is my build slow",
                            "bubbles": [
                                { "type": "user", "text": "Why is my build slow?" },
                                { "type": "ai", "text": "Incremental compilation is off." }
                            ]
                        }] }),
                    ),
                    (
                        "composer.composerData",
                        json!({ "allComposers": [{ "composerId": "comp-1", "text": "Add login form" }] }),
                    ),
                ],
            )
            .expect("workspace");

        let (status, _, body) = get_page(&fixture, "/workspace/ws1", false).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Why is my build slow"));
        assert!(body.contains("Incremental compilation is off."));
        assert!(body.contains("bubble-assistant"));
        assert!(body.contains("Add login form"));
    }

    #[tokio::test]
    async fn unknown_workspace_renders_not_found_page() {
        let fixture = WorkspaceFixture::new().expect("fixture");

        let (status, _, body) = get_page(&fixture, "/workspace/missing", false).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Workspace not found"));
    }

    #[tokio::test]
    async fn htmx_errors_become_toasts() {
        let fixture = WorkspaceFixture::new().expect("fixture");
        fixture.add_workspace("empty", &[]).expect("workspace");

        let (status, headers, body) = get_page(&fixture, "/workspace/empty", true).await;

        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
        let trigger = headers
            .get("HX-Trigger")
            .and_then(|value| value.to_str().ok())
            .expect("trigger header");
        assert!(trigger.contains("No chat data found"));
    }
}
