//! HTTP client with tracing and a per-client timeout.
//!
//! One client is built per run. Requests carry either a JSON body (login) or
//! a bearer token (stalls), never both.

use reqwest::{header, Client, Request, Response};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::HttpError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for `StallMap`.
const USER_AGENT: &str = concat!("StallMap/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { inner, timeout })
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds a GET request that carries only a bearer token.
    ///
    /// Split from [`HttpClient::get_with_bearer`] so the exact request can be
    /// inspected before it is sent.
    pub fn bearer_get(&self, url: &str, token: &str) -> Result<Request, HttpError> {
        let value = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| HttpError::InvalidHeader(e.to_string()))?;

        Ok(self
            .inner
            .get(url)
            .header(header::AUTHORIZATION, value)
            .build()?)
    }

    /// Performs a GET request with a bearer token.
    #[instrument(skip(self, token), fields(url = %url))]
    pub async fn get_with_bearer(&self, url: &str, token: &str) -> Result<Response, HttpError> {
        let request = self.bearer_get(url, token)?;
        debug!("GET request with bearer token");

        let response = self.inner.execute(request).await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a POST request with JSON body.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<Response, HttpError> {
        debug!("POST request with JSON");

        let response = self.inner.post(url).json(body).send().await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
