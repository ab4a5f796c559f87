use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{HeaderName, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Extension,
};
use axum_htmx::{HxRequest, HX_TRIGGER};
use common::{
    error::AppError,
    utils::template_engine::{ProvidesTemplateEngine, Value},
};
use minijinja::context;
use serde::Serialize;
use serde_json::json;
use tracing::error;

#[derive(Clone, Debug)]
pub enum TemplateKind {
    Full(String),
    Partial(String, String),
    Error(StatusCode),
}

#[derive(Clone)]
pub struct TemplateResponse {
    template_kind: TemplateKind,
    context: Value,
}

impl TemplateResponse {
    pub fn new_template<T: Serialize>(name: impl Into<String>, context: T) -> Self {
        Self {
            template_kind: TemplateKind::Full(name.into()),
            context: Value::from_serialize(&context),
        }
    }

    pub fn new_partial<T: Serialize>(
        template: impl Into<String>,
        block: impl Into<String>,
        context: T,
    ) -> Self {
        Self {
            template_kind: TemplateKind::Partial(template.into(), block.into()),
            context: Value::from_serialize(&context),
        }
    }

    pub fn error(status: StatusCode, title: &str, description: &str) -> Self {
        let ctx = context! {
            status_code => status.as_u16(),
            title => title,
            description => description
        };
        Self {
            template_kind: TemplateKind::Error(status),
            context: ctx,
        }
    }

    pub fn not_found() -> Self {
        Self::error(
            StatusCode::NOT_FOUND,
            "Page Not Found",
            "The page you're looking for doesn't exist or was removed.",
        )
    }

    pub fn not_found_with(description: &str) -> Self {
        Self::error(StatusCode::NOT_FOUND, "Not Found", description)
    }

    pub fn server_error() -> Self {
        Self::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Something went wrong reading the editor storage.",
        )
    }

    pub fn bad_request(message: &str) -> Self {
        Self::error(StatusCode::BAD_REQUEST, "Bad Request", message)
    }
}

impl IntoResponse for TemplateResponse {
    fn into_response(self) -> Response {
        Extension(self).into_response()
    }
}

#[derive(Serialize)]
struct ContextWrapper<'a> {
    nav_path: &'a str,
    #[serde(flatten)]
    context: HashMap<String, Value>,
}

// Headers to forward from the original response
const HTMX_HEADERS_TO_FORWARD: &[&str] = &["HX-Push", "HX-Trigger", "HX-Redirect"];

pub async fn with_template_response<S>(
    State(state): State<S>,
    HxRequest(is_htmx): HxRequest,
    req: Request,
    next: Next,
) -> Response
where
    S: ProvidesTemplateEngine + Clone + Send + Sync + 'static,
{
    let nav_path = req.uri().path().to_string();
    let response = next.run(req).await;

    let Some(template_response) = response.extensions().get::<TemplateResponse>().cloned() else {
        return response;
    };

    let template_engine = state.template_engine();

    let context_map = match context_to_map(&template_response.context) {
        Ok(map) => map,
        Err(kind) => {
            error!(
                "Template context must be a map or unit, got kind={:?} for template_kind={:?}",
                kind, template_response.template_kind
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response();
        }
    };

    let context = ContextWrapper {
        nav_path: &nav_path,
        context: context_map,
    };

    match &template_response.template_kind {
        TemplateKind::Full(name) => {
            match template_engine.render(name, &Value::from_serialize(&context)) {
                Ok(html) => {
                    let mut final_response = Html(html).into_response();
                    forward_headers(response.headers(), final_response.headers_mut());
                    final_response
                }
                Err(e) => {
                    error!("Failed to render template '{}': {:?}", name, e);
                    (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response()
                }
            }
        }
        TemplateKind::Partial(template, block) => {
            match template_engine.render_block(template, block, &Value::from_serialize(&context))
            {
                Ok(html) => {
                    let mut final_response = Html(html).into_response();
                    forward_headers(response.headers(), final_response.headers_mut());
                    final_response
                }
                Err(e) => {
                    error!("Failed to render block '{}/{}': {:?}", template, block, e);
                    (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response()
                }
            }
        }
        TemplateKind::Error(status) => {
            if is_htmx {
                // HTMX request: Send 204 + HX-Trigger for toast
                let title = context_str(&template_response.context, "title", "Error");
                let description =
                    context_str(&template_response.context, "description", "An error occurred.");

                let trigger_payload = json!({"toast": {"title": title, "description": description, "type": "error"}});
                (StatusCode::NO_CONTENT, [(HX_TRIGGER, trigger_payload.to_string())], "")
                    .into_response()
            } else {
                match template_engine.render("errors/error.html", &Value::from_serialize(&context))
                {
                    Ok(html) => (*status, Html(html)).into_response(),
                    Err(e) => {
                        error!("Critical: Failed to render 'errors/error.html': {:?}", e);
                        (*status, Html(fallback_error())).into_response()
                    }
                }
            }
        }
    }
}

fn context_to_map(value: &Value) -> Result<HashMap<String, Value>, minijinja::value::ValueKind> {
    match value.kind() {
        minijinja::value::ValueKind::Map => {
            let mut map = HashMap::new();
            if let Ok(keys) = value.try_iter() {
                for key in keys {
                    if let Ok(val) = value.get_item(&key) {
                        map.insert(key.to_string(), val);
                    }
                }
            }
            Ok(map)
        }
        minijinja::value::ValueKind::None | minijinja::value::ValueKind::Undefined => {
            Ok(HashMap::new())
        }
        other => Err(other),
    }
}

fn context_str(context: &Value, key: &str, fallback: &str) -> String {
    context
        .get_attr(key)
        .ok()
        .and_then(|v| v.as_str().map(String::from))
        .unwrap_or_else(|| fallback.to_string())
}

fn forward_headers(from: &axum::http::HeaderMap, to: &mut axum::http::HeaderMap) {
    for &header_name in HTMX_HEADERS_TO_FORWARD {
        if let Ok(name) = HeaderName::from_bytes(header_name.as_bytes()) {
            if let Some(value) = from.get(&name) {
                to.insert(name.clone(), value.clone());
            }
        }
    }
}

#[derive(Debug)]
pub enum HtmlError {
    AppError(AppError),
}

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        Self::AppError(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        match self {
            Self::AppError(err) => match err {
                AppError::NotFound(msg) => TemplateResponse::not_found_with(&msg).into_response(),
                AppError::Validation(msg) => TemplateResponse::bad_request(&msg).into_response(),
                _ => {
                    error!("Internal error: {:?}", err);
                    TemplateResponse::server_error().into_response()
                }
            },
        }
    }
}

fn fallback_error() -> String {
    r#"
    <html>
        <body>
            <main class="page">
                <h1>Error</h1>
                <p>Sorry, something went wrong displaying this page.</p>
            </main>
        </body>
    </html>
    "#
    .to_string()
}
