use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::api::client::Backend;
use crate::api::models::ResultCategory;
use crate::controller::BackendStatus;
use crate::error::Result;
use crate::session::{Session, SessionId, SESSION_COOKIE};
use crate::view::page;
use crate::web::response;
use crate::AppState;

pub fn create_router<B: Backend + 'static>(app_state: AppState<B>) -> Router {
    Router::new()
        .route("/", get(index_handler::<B>))
        .route("/check", post(check_handler::<B>))
        .route("/filter", post(filter_handler::<B>))
        .route("/history/prev", post(prev_handler::<B>))
        .route("/history/next", post(next_handler::<B>))
        .route("/history/clear", get(confirm_clear_handler).post(clear_handler::<B>))
        .route("/history/export", get(export_handler::<B>))
        .route("/api/status", get(status_handler::<B>))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[derive(Deserialize)]
pub struct CheckForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub source_url: String,
}

#[derive(Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub result: String,
}

#[derive(Deserialize)]
pub struct ClearForm {
    #[serde(default)]
    pub confirm: String,
}

type SessionCookie = [(header::HeaderName, String); 1];

/// Session named by the request's cookie, or a new one.
async fn open_session<B: Backend>(state: &AppState<B>, headers: &HeaderMap) -> (SessionCookie, Arc<Session>) {
    let (id, session) = state.controller.session(session_from_headers(headers)).await;
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    ([(header::SET_COOKIE, cookie)], session)
}

fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.parse().ok())
}

async fn index_handler<B: Backend>(State(state): State<AppState<B>>, headers: HeaderMap) -> impl IntoResponse {
    let (cookie, session) = open_session(&state, &headers).await;
    // On failure the table keeps what it showed before.
    if let Err(err) = state.controller.reload_history(&session).await {
        warn!(error = %err, "history refresh on page load failed");
    }
    let ui = session.snapshot().await;
    (cookie, Html(page::document(&ui)))
}

async fn check_handler<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    Form(form): Form<CheckForm>,
) -> impl IntoResponse {
    let (cookie, session) = open_session(&state, &headers).await;
    // Failures are already reflected in the result panel.
    if let Err(err) = state.controller.submit_analysis(&session, &form.text, &form.source_url).await {
        debug!(error = %err, "check request ended with an error");
    }
    (cookie, Redirect::to("/"))
}

async fn filter_handler<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    Form(form): Form<FilterForm>,
) -> impl IntoResponse {
    let (cookie, session) = open_session(&state, &headers).await;
    let filter = ResultCategory::parse_filter(&form.result).unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unknown history filter");
        None
    });
    if let Err(err) = state.controller.apply_filter(&session, filter).await {
        debug!(error = %err, "filter request ended with an error");
    }
    (cookie, Redirect::to("/"))
}

async fn prev_handler<B: Backend>(State(state): State<AppState<B>>, headers: HeaderMap) -> impl IntoResponse {
    let (cookie, session) = open_session(&state, &headers).await;
    if let Err(err) = state.controller.previous_page(&session).await {
        debug!(error = %err, "previous page request ended with an error");
    }
    (cookie, Redirect::to("/"))
}

async fn next_handler<B: Backend>(State(state): State<AppState<B>>, headers: HeaderMap) -> impl IntoResponse {
    let (cookie, session) = open_session(&state, &headers).await;
    if let Err(err) = state.controller.next_page(&session).await {
        debug!(error = %err, "next page request ended with an error");
    }
    (cookie, Redirect::to("/"))
}

async fn confirm_clear_handler() -> Html<String> {
    Html(page::confirm_clear_document())
}

async fn clear_handler<B: Backend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    Form(form): Form<ClearForm>,
) -> impl IntoResponse {
    let (cookie, session) = open_session(&state, &headers).await;
    let accepted = form.confirm == "yes";
    if let Err(err) = state.controller.clear_history(&session, &move |_: &str| accepted).await {
        debug!(error = %err, "clear request ended with an error");
    }
    (cookie, Redirect::to("/"))
}

async fn export_handler<B: Backend>(State(state): State<AppState<B>>) -> Result<impl IntoResponse> {
    let csv = state.controller.export_history().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"history_export.csv\""),
        ],
        csv,
    ))
}

#[derive(Serialize)]
pub struct StatusReport {
    pub backend_url: String,
    #[serde(flatten)]
    pub backend: BackendStatus,
}

async fn status_handler<B: Backend>(State(state): State<AppState<B>>) -> impl IntoResponse {
    let backend = state.controller.backend_status().await;
    let healthy = backend.healthy;
    let report = StatusReport {
        backend_url: state.config.backend_url.clone(),
        backend,
    };
    if healthy {
        response::success(report)
    } else {
        let message = format!("Backend unavailable: {}", report.backend.status);
        response::degraded(StatusCode::SERVICE_UNAVAILABLE, report, message)
    }
}
