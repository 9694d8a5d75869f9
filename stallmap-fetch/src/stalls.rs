//! Stall retrieval: `GET {backend}/api/employee/stalls` with a bearer token.

use async_trait::async_trait;
use reqwest::StatusCode;
use stallmap_core::{BaseUrl, SessionToken, StallMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::AccessError;
use crate::host::http::HttpClient;

/// Stalls endpoint path.
pub const STALLS_PATH: &str = "/api/employee/stalls";

/// Something that can return the stall map for a token.
#[async_trait]
pub trait StallSource: Send + Sync {
    /// Fetches all stalls visible to the token's employee.
    async fn fetch_stalls(
        &self,
        backend: &BaseUrl,
        token: &SessionToken,
    ) -> Result<StallMap, AccessError>;
}

/// Fetches stalls over HTTP.
#[derive(Debug, Clone)]
pub struct StallFetcher {
    http: Arc<HttpClient>,
}

impl StallFetcher {
    /// Creates a fetcher on the given client. The client's timeout bounds
    /// the request.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl StallSource for StallFetcher {
    #[instrument(skip(self, token), fields(backend = %backend))]
    async fn fetch_stalls(
        &self,
        backend: &BaseUrl,
        token: &SessionToken,
    ) -> Result<StallMap, AccessError> {
        let url = backend.join(STALLS_PATH);
        info!(url = %url, "Fetching stalls");

        let response = self.http.get_with_bearer(&url, token.expose()).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AccessError::Network(e.into()))?;

        if status != StatusCode::OK {
            warn!(status = %status, "Stalls request failed");
            return Err(AccessError::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        let stalls = StallMap::from_json(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse stalls response");
            AccessError::Decode(e.to_string())
        })?;

        debug!(count = stalls.len(), "Stalls decoded");
        Ok(stalls)
    }
}
