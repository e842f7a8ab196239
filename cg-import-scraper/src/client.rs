use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};
use url::Url;

use cg_import_core::BatchPayload;

use crate::error::ScrapeError;
use crate::types::{PollResponse, StatusResponse, SubmitResponse};

const KAMAI_BASE_URL: &str = "https://kamai.tachi.ac";
const IMPORT_ENDPOINT: &str = "/ir/direct-manual/import";
const WHOAMI_ENDPOINT: &str = "/api/v1/users/me";

/// Minimum spacing between profile page requests. The CG servers are small;
/// do not lower this.
const PAGE_FETCH_INTERVAL: Duration = Duration::from_millis(250);

/// HTTP client for CG profile pages and the Kamaitachi API.
///
/// Page fetches go through [`rate_limit`](Self::fetch_page) spacing; API
/// calls are already serialized one batch at a time by the emitter and need
/// no extra pacing.
pub struct TachiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    last_page_fetch: Arc<Mutex<Instant>>,
}

impl TachiClient {
    /// Create a client holding the given bearer key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ScrapeError> {
        Self::with_base_url(api_key, KAMAI_BASE_URL)
    }

    /// Client with no API key, for page fetching only (export mode never
    /// talks to the Kamaitachi API).
    pub fn anonymous() -> Result<Self, ScrapeError> {
        Self::new(String::new())
    }

    /// Like [`new`](Self::new), but pointed at a different Kamaitachi
    /// deployment.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ScrapeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            last_page_fetch: Arc::new(Mutex::new(Instant::now() - PAGE_FETCH_INTERVAL)),
        })
    }

    /// Sleep until at least [`PAGE_FETCH_INTERVAL`] has passed since the
    /// previous page fetch.
    async fn rate_limit(&self) {
        let mut last = self.last_page_fetch.lock().await;
        let elapsed = last.elapsed();
        if elapsed < PAGE_FETCH_INTERVAL {
            tokio::time::sleep(PAGE_FETCH_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }

    /// Fetch one profile page's markup.
    pub async fn fetch_page(&self, url: &Url) -> Result<String, ScrapeError> {
        self.rate_limit().await;

        log::debug!("GET {}", url);
        let resp = self.http.get(url.clone()).send().await?;
        let text = resp.error_for_status()?.text().await?;
        Ok(text)
    }

    /// Check the API key against the whoami endpoint.
    pub async fn verify_key(&self) -> Result<(), ScrapeError> {
        let url = format!("{}{}", self.base_url, WHOAMI_ENDPOINT);
        let resp = self.http.get(&url).bearer_auth(&self.api_key).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ScrapeError::InvalidCredentials(
                "API key rejected".to_string(),
            ));
        }

        let envelope: StatusResponse = resp.json().await?;
        if !envelope.success {
            return Err(ScrapeError::InvalidCredentials(envelope.description));
        }
        Ok(())
    }

    /// Submit one batch and return the status URL to poll.
    pub async fn submit_batch(&self, payload: &BatchPayload) -> Result<String, ScrapeError> {
        let url = format!("{}{}", self.base_url, IMPORT_ENDPOINT);

        log::debug!(
            "POST {} ({} {} scores, version {})",
            url,
            payload.scores.len(),
            payload.meta.playtype,
            payload.meta.version
        );
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("X-User-Intent", "true")
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ScrapeError::InvalidCredentials(
                "API key rejected".to_string(),
            ));
        }

        let envelope: SubmitResponse = resp.json().await?;
        if !envelope.success {
            return Err(ScrapeError::Rejected(envelope.description));
        }
        envelope
            .body
            .map(|b| b.url)
            .ok_or_else(|| ScrapeError::Api("submission response had no status URL".to_string()))
    }

    /// Fetch the current status of a submitted import.
    pub async fn poll_import(&self, status_url: &str) -> Result<PollResponse, ScrapeError> {
        log::debug!("GET {}", status_url);
        let resp = self
            .http
            .get(status_url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        Ok(resp.json().await?)
    }
}
