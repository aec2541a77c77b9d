use std::future::Future;

use reqwest::{Client, ClientBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::models::{
    AnalysisRequest, AnalysisResult, BackendErrorBody, HealthResponse, HistoryPage, HistoryQuery,
};
use crate::config::Config;
use crate::error::{AppError, Result};

/// The verification backend as seen by the client controller.
pub trait Backend: Send + Sync {
    fn analyze(&self, request: &AnalysisRequest) -> impl Future<Output = Result<AnalysisResult>> + Send;

    fn history(&self, query: HistoryQuery) -> impl Future<Output = Result<HistoryPage>> + Send;

    fn clear_history(&self) -> impl Future<Output = Result<()>> + Send;

    /// CSV dump of every stored record.
    fn export_history(&self) -> impl Future<Output = Result<String>> + Send;

    fn health(&self) -> impl Future<Output = Result<HealthResponse>> + Send;
}

/// `Backend` over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = ClientBuilder::new().pool_max_idle_per_host(10);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self::new(config.backend_url.clone(), client))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Backend for HttpBackend {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        debug!(text_len = request.text.len(), "POST /analyze");
        let res = self.client.post(self.url("/analyze")).json(request).send().await?;
        read_json(res).await
    }

    async fn history(&self, query: HistoryQuery) -> Result<HistoryPage> {
        debug!(page = query.page, filter = ?query.result, "GET /history");
        let res = self
            .client
            .get(self.url("/history"))
            .query(&query.to_params())
            .send()
            .await?;
        read_json(res).await
    }

    async fn clear_history(&self) -> Result<()> {
        debug!("DELETE /history");
        let res = self.client.delete(self.url("/history")).send().await?;
        ensure_success(res).await.map(|_| ())
    }

    async fn export_history(&self) -> Result<String> {
        debug!("GET /history/export");
        let res = self.client.get(self.url("/history/export")).send().await?;
        let res = ensure_success(res).await?;
        Ok(res.text().await?)
    }

    async fn health(&self) -> Result<HealthResponse> {
        let res = self.client.get(self.url("/health")).send().await?;
        read_json(res).await
    }
}

/// Decodes a JSON body, turning non-2xx statuses into `ServerError`.
///
/// A body that is not valid JSON is a transport failure whatever the status.
async fn read_json<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        let parsed: BackendErrorBody = serde_json::from_str(&body)
            .map_err(|e| AppError::TransportError(format!("Invalid error body: {}", e)))?;
        return Err(AppError::ServerError {
            status: status.as_u16(),
            message: parsed.error,
        });
    }

    serde_json::from_str(&body).map_err(|e| AppError::TransportError(format!("Invalid response body: {}", e)))
}

async fn ensure_success(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let message = res
        .json::<BackendErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error);
    Err(AppError::ServerError {
        status: status.as_u16(),
        message,
    })
}
