use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Path, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{found, AppError};
use crate::models::BugReport;
use crate::templates::Page;

use crate::AppState;

type AppResult<T> = Result<T, AppError>;

/// Room for the text fields and multipart framing on top of the screenshot
const FORM_OVERHEAD: usize = 64 * 1024;

/// The full application, ready to serve
pub fn app(state: Arc<AppState>) -> Router {
    routes(&state.config)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn routes(config: &Config) -> Router<Arc<AppState>> {
    let style_dir = config.views_dir.join("style");
    let favicon = config.views_dir.join("images").join("favicon.ico");

    Router::new()
        // Pages
        .route("/", get(report_page))
        .route("/:page", get(named_page))
        // Submission
        .route("/send", post(send_report))
        // Static assets
        .route_service("/favicon.ico", ServeFile::new(favicon))
        .nest_service("/views/style", ServeDir::new(style_dir))
        .layer(DefaultBodyLimit::max(
            config.max_screenshot_size.saturating_add(FORM_OVERHEAD),
        ))
}

// ─── Pages ───────────────────────────────────────────────────────

async fn report_page(State(state): State<Arc<AppState>>) -> AppResult<Html<String>> {
    render_page(&state, Page::Report)
}

async fn named_page(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<Html<String>> {
    let page = Page::from_path(&name).ok_or(AppError::PageNotFound(name))?;
    render_page(&state, page)
}

fn render_page(state: &AppState, page: Page) -> AppResult<Html<String>> {
    state.templates.render(page, None).map(Html).map_err(|e| {
        error!("Could not render template {}: {}", page.template_name(), e);
        e
    })
}

// ─── Submission ──────────────────────────────────────────────────

async fn send_report(
    State(state): State<Arc<AppState>>,
    report: Result<BugReport, AppError>,
) -> Response {
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("Could not get values: {}", e);
            return e.into_response();
        }
    };

    if let Err(e) = state.mailer.send(&report).await {
        error!("Could not send email: {}", e);
        return e.into_response();
    }

    info!("Success - mail sent: {:?}", report);
    found("/success")
}
