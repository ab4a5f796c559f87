use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use axum_htmx::HxRequest;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::warn;

use common::{
    error::AppError,
    storage::types::workspace::WorkspaceSummary,
    utils::display_path::normalize_path,
};

use crate::{
    html_state::HtmlState,
    middlewares::response_middleware::{HtmlError, TemplateResponse},
};

/// A workspace row as the dashboard shows it.
#[derive(Debug, Serialize)]
pub struct WorkspaceCard {
    id: String,
    folder: Option<String>,
    short_path: String,
    full_path: String,
    last_modified: DateTime<Utc>,
    last_modified_date: String,
    composer_count: usize,
}

impl From<WorkspaceSummary> for WorkspaceCard {
    fn from(summary: WorkspaceSummary) -> Self {
        let (short_path, full_path) = match summary.folder.as_deref() {
            Some(folder) => {
                let path = normalize_path(folder);
                (path.short_path, path.full_path)
            }
            None => (summary.id.clone(), "No folder".to_string()),
        };

        Self {
            last_modified_date: long_date(&summary.last_modified),
            id: summary.id,
            folder: summary.folder,
            short_path,
            full_path,
            last_modified: summary.last_modified,
            composer_count: summary.composer_count,
        }
    }
}

fn long_date(at: &DateTime<Utc>) -> String {
    at.format("%B %-d, %Y").to_string()
}

/// Lists workspaces, treating a missing storage root as an empty listing.
async fn load_workspaces(state: &HtmlState) -> Result<Vec<WorkspaceSummary>, AppError> {
    match state.workspaces.list_workspaces().await {
        Ok(workspaces) => Ok(workspaces),
        Err(AppError::NotFound(msg)) => {
            warn!("{msg}");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}

#[derive(Serialize)]
pub struct IndexPageData {
    workspaces: Vec<WorkspaceCard>,
    workspace_root: String,
}

pub async fn index_handler(
    State(state): State<HtmlState>,
) -> Result<impl IntoResponse, HtmlError> {
    let workspaces = load_workspaces(&state).await?;

    // The table counts composers left after chat conversations are split off.
    let counts = join_all(
        workspaces
            .iter()
            .map(|workspace| state.workspaces.composer_count(&workspace.id)),
    )
    .await;

    let workspaces = workspaces
        .into_iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(summary, composer_count)| {
            WorkspaceCard::from(WorkspaceSummary {
                composer_count,
                ..summary
            })
        })
        .collect();

    Ok(TemplateResponse::new_template(
        "dashboard/index.html",
        IndexPageData {
            workspaces,
            workspace_root: state.config.workspace_path.clone(),
        },
    ))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryView {
    #[default]
    List,
    Grid,
    Timeline,
}

impl GalleryView {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("grid") => Self::Grid,
            Some("timeline") => Self::Timeline,
            _ => Self::List,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    #[default]
    Comfortable,
    Spacious,
}

impl Density {
    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("compact") => Self::Compact,
            Some("spacious") => Self::Spacious,
            _ => Self::Comfortable,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryParams {
    view: Option<String>,
    density: Option<String>,
}

/// Workspaces sharing one last-modified date, in listing order.
#[derive(Debug, Serialize)]
pub struct DateGroup {
    date: String,
    workspaces: Vec<WorkspaceCard>,
}

fn group_by_date(cards: Vec<WorkspaceCard>) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();
    for card in cards {
        match groups
            .iter_mut()
            .find(|group| group.date == card.last_modified_date)
        {
            Some(group) => group.workspaces.push(card),
            None => groups.push(DateGroup {
                date: card.last_modified_date.clone(),
                workspaces: vec![card],
            }),
        }
    }
    groups
}

#[derive(Serialize)]
pub struct GalleryPageData {
    view: GalleryView,
    density: Density,
    workspaces: Vec<WorkspaceCard>,
    groups: Vec<DateGroup>,
}

pub async fn gallery_handler(
    State(state): State<HtmlState>,
    HxRequest(is_htmx): HxRequest,
    Query(params): Query<GalleryParams>,
) -> Result<impl IntoResponse, HtmlError> {
    let view = GalleryView::parse(params.view.as_deref());
    let density = Density::parse(params.density.as_deref());

    let cards: Vec<WorkspaceCard> = load_workspaces(&state)
        .await?
        .into_iter()
        .map(WorkspaceCard::from)
        .collect();

    let (workspaces, groups) = if view == GalleryView::Timeline {
        (Vec::new(), group_by_date(cards))
    } else {
        (cards, Vec::new())
    };

    let data = GalleryPageData {
        view,
        density,
        workspaces,
        groups,
    };

    if is_htmx {
        Ok(TemplateResponse::new_partial(
            "dashboard/gallery.html",
            "gallery_items",
            data,
        ))
    } else {
        Ok(TemplateResponse::new_template("dashboard/gallery.html", data))
    }
}
