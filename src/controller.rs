//! Client controller: turns UI actions into backend calls and keeps the UI state.
//!
//! Every visitor has its own [`Session`]; its [`UiState`] sits behind an async
//! mutex that is never held across a backend call. History loads and analyses
//! each take a per-session generation ticket; a response that arrives after a
//! newer request of the same kind was issued is dropped instead of overwriting
//! the newer state.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::client::Backend;
use crate::api::models::{AnalysisRequest, AnalysisResult, HistoryQuery, ResultCategory};
use crate::error::{AppError, Result};
use crate::session::{Session, SessionId, SessionLimits, SessionStore};
use crate::view::history::{page_label, HistoryTable};
use crate::view::result::ResultPanel;

pub const PAGE_SIZE: u32 = 10;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text.";
pub const PREDICTION_FAILED_MESSAGE: &str = "Prediction failed.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again.";
pub const CLEAR_HISTORY_PROMPT: &str = "Clear all verification history?";

/// Interactive yes/no question put to the user before destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingState {
    pub current_page: u32,
    pub current_filter: Option<ResultCategory>,
}

impl Default for PagingState {
    fn default() -> Self {
        Self {
            current_page: 1,
            current_filter: None,
        }
    }
}

/// Everything the page shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub draft_text: String,
    pub draft_source_url: String,
    pub result: ResultPanel,
    pub history: HistoryTable,
    pub paging: PagingState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLoad {
    Applied,
    /// A newer load was issued while this one was in flight.
    Superseded,
    /// Nothing to load (already on the first page, or no next page).
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Declined,
    Cleared,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackendStatus {
    pub healthy: bool,
    pub status: String,
    pub checked_at: DateTime<Utc>,
}

pub struct Controller<B> {
    backend: B,
    sessions: SessionStore,
}

impl<B: Backend> Controller<B> {
    pub fn new(backend: B) -> Self {
        Self::with_limits(backend, SessionLimits::default())
    }

    pub fn with_limits(backend: B, limits: SessionLimits) -> Self {
        Self {
            backend,
            sessions: SessionStore::new(limits),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Session for a visitor, opening a new one when `id` is unknown or expired.
    pub async fn session(&self, id: Option<SessionId>) -> (SessionId, Arc<Session>) {
        self.sessions.get_or_create(id).await
    }

    pub async fn submit_analysis(&self, session: &Session, text: &str, source_url: &str) -> Result<AnalysisResult> {
        let text = text.trim();
        let source_url = source_url.trim();
        let ticket = session.analysis_generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = session.state.lock().await;
            state.draft_text = text.to_string();
            state.draft_source_url = source_url.to_string();
            if text.is_empty() {
                state.result = ResultPanel::Error(EMPTY_INPUT_MESSAGE.to_string());
                return Err(AppError::ValidationError(EMPTY_INPUT_MESSAGE.to_string()));
            }
            state.result = ResultPanel::Checking;
        }

        let request = AnalysisRequest {
            text: text.to_string(),
            source_url: source_url.to_string(),
        };
        let outcome = self.backend.analyze(&request).await;

        {
            let mut state = session.state.lock().await;
            if session.analysis_generation.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "dropping superseded analysis response");
                return outcome;
            }
            match &outcome {
                Ok(result) => {
                    info!(result = ?result.result, method = ?result.verification_method, "analysis complete");
                    state.result = ResultPanel::Success(Box::new(result.clone()));
                    state.paging.current_filter = None;
                }
                Err(err) => {
                    warn!(error = %err, "analysis failed");
                    state.result = ResultPanel::Error(panel_message(err));
                }
            }
        }

        if outcome.is_ok() {
            // The panel keeps the verdict even if the table cannot be refreshed.
            if let Err(err) = self.load_history(session, 1).await {
                warn!(error = %err, "history reload after analysis failed");
            }
        }

        outcome
    }

    pub async fn load_history(&self, session: &Session, page: u32) -> Result<HistoryLoad> {
        let page = page.max(1);
        let ticket = session.history_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let filter = session.state.lock().await.paging.current_filter;
        let query = HistoryQuery {
            page,
            limit: PAGE_SIZE,
            result: filter,
        };

        let response = self.backend.history(query).await.map_err(|err| {
            warn!(page, error = %err, "history load failed");
            err
        })?;

        let mut state = session.state.lock().await;
        if session.history_generation.load(Ordering::SeqCst) != ticket {
            debug!(page, ticket, "dropping superseded history response");
            return Ok(HistoryLoad::Superseded);
        }

        let current = response.page.filter(|p| *p >= 1).unwrap_or(page);
        let full = response.items.len() == PAGE_SIZE as usize;
        debug!(page = current, items = response.items.len(), "history loaded");

        state.paging.current_page = current;
        state.history = HistoryTable {
            records: response.items,
            page_label: page_label(current),
            prev_disabled: current <= 1,
            next_disabled: !full,
        };
        Ok(HistoryLoad::Applied)
    }

    /// Fetches the page the session is on again, e.g. when the page is reopened.
    pub async fn reload_history(&self, session: &Session) -> Result<HistoryLoad> {
        let current = session.state.lock().await.paging.current_page;
        self.load_history(session, current).await
    }

    pub async fn apply_filter(&self, session: &Session, filter: Option<ResultCategory>) -> Result<HistoryLoad> {
        session.state.lock().await.paging.current_filter = filter;
        info!(filter = ?filter, "history filter applied");
        self.load_history(session, 1).await
    }

    pub async fn previous_page(&self, session: &Session) -> Result<HistoryLoad> {
        let current = session.state.lock().await.paging.current_page;
        if current <= 1 {
            return Ok(HistoryLoad::Skipped);
        }
        self.load_history(session, current - 1).await
    }

    pub async fn next_page(&self, session: &Session) -> Result<HistoryLoad> {
        let (current, has_next) = {
            let state = session.state.lock().await;
            (state.paging.current_page, !state.history.next_disabled)
        };
        if !has_next {
            return Ok(HistoryLoad::Skipped);
        }
        self.load_history(session, current.saturating_add(1)).await
    }

    /// Clears all history after confirmation. Page 1 is reloaded even when the
    /// delete fails, so the table shows what the backend actually holds.
    pub async fn clear_history<C>(&self, session: &Session, confirm: &C) -> Result<ClearOutcome>
    where
        C: Confirm + Sync + ?Sized,
    {
        if !confirm.confirm(CLEAR_HISTORY_PROMPT) {
            debug!("history clear declined");
            return Ok(ClearOutcome::Declined);
        }

        let cleared = self.backend.clear_history().await;
        match &cleared {
            Ok(()) => info!("history cleared"),
            Err(err) => warn!(error = %err, "history clear failed"),
        }

        let reloaded = self.load_history(session, 1).await;
        cleared?;
        reloaded?;
        Ok(ClearOutcome::Cleared)
    }

    pub async fn export_history(&self) -> Result<String> {
        let csv = self.backend.export_history().await?;
        debug!(bytes = csv.len(), "history exported");
        Ok(csv)
    }

    pub async fn backend_status(&self) -> BackendStatus {
        let checked_at = Utc::now();
        match self.backend.health().await {
            Ok(health) => BackendStatus {
                healthy: health.status == "ok",
                status: health.status,
                checked_at,
            },
            Err(err) => {
                warn!(error = %err, "backend health check failed");
                BackendStatus {
                    healthy: false,
                    status: err.to_string(),
                    checked_at,
                }
            }
        }
    }
}

/// Text shown in the result panel for a failed analysis.
pub fn panel_message(err: &AppError) -> String {
    match err {
        AppError::ValidationError(msg) => msg.clone(),
        AppError::ServerError { message: Some(msg), .. } if !msg.is_empty() => msg.clone(),
        AppError::ServerError { .. } => PREDICTION_FAILED_MESSAGE.to_string(),
        AppError::TransportError(_) | AppError::ConfigError(_) => SERVER_ERROR_MESSAGE.to_string(),
    }
}
