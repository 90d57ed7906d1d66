//! HTTP transport for NCBI E-utilities.

use crate::types::{Article, SearchResult};
use crate::LiteratureSource;
use pubmed_core::config::EutilsSettings;
use pubmed_core::{AppError, AppResult};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REQUESTS_PER_SECOND: u32 = 3;
const REQUESTS_PER_SECOND_WITH_KEY: u32 = 10;

/// NCBI E-utilities client.
///
/// Requests are spaced to stay under NCBI's published limits: 3 per second,
/// or 10 per second with an API key.
pub struct EutilsClient {
    base_url: String,
    api_key: Option<String>,
    tool: String,
    email: Option<String>,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
    http: reqwest::Client,
}

impl EutilsClient {
    /// Build from settings; `api_key` raises the rate limit.
    pub fn new(settings: &EutilsSettings, api_key: Option<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Literature(format!("Failed to build HTTP client: {}", e)))?;

        let per_second = if api_key.is_some() {
            REQUESTS_PER_SECOND_WITH_KEY
        } else {
            REQUESTS_PER_SECOND
        };

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            tool: settings.tool.clone(),
            email: settings.email.clone(),
            min_interval: Duration::from_secs(1) / per_second,
            last_request: Mutex::new(None),
            http,
        })
    }

    /// Minimum spacing between consecutive requests.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// GET `{base}/{endpoint}` with `params` plus the identification params.
    pub(crate) async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> AppResult<String> {
        self.throttle().await;

        let mut query: Vec<(&str, String)> = params.to_vec();
        if let Some(ref key) = self.api_key {
            query.push(("api_key", key.clone()));
        }
        if !self.tool.is_empty() {
            query.push(("tool", self.tool.clone()));
        }
        if let Some(ref email) = self.email {
            query.push(("email", email.clone()));
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(endpoint, "NCBI request");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::Literature(format!("executing request: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::Literature(
                "NCBI rate limit exceeded (HTTP 429). Consider setting an API key via NCBI_API_KEY"
                    .to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::Literature(format!(
                "NCBI returned HTTP {} for {}",
                status.as_u16(),
                endpoint
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Literature(format!("reading response: {}", e)))
    }

    /// Wait until `min_interval` has passed since the previous request.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait::async_trait]
impl LiteratureSource for EutilsClient {
    async fn search(&self, query: &str, limit: usize) -> AppResult<SearchResult> {
        self.esearch(query, limit).await
    }

    async fn fetch(&self, ids: &[String]) -> AppResult<Vec<Article>> {
        self.efetch(ids).await
    }
}
