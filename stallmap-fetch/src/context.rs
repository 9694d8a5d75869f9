//! Access context providing host APIs to authenticators and fetchers.

use std::sync::Arc;
use std::time::Duration;

use crate::error::HttpError;
use crate::host::http::{HttpClient, DEFAULT_TIMEOUT_SECS};

/// Browser login waits this long for the dashboard redirect.
pub const DEFAULT_NAVIGATION_TIMEOUT_SECS: u64 = 15;

/// Interval between URL checks while waiting for the redirect.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Access Settings
// ============================================================================

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct AccessSettings {
    /// Timeout for each HTTP request.
    pub request_timeout: Duration,
    /// How long the browser login waits for the dashboard URL.
    pub navigation_timeout: Duration,
    /// How often the browser login re-reads the page URL.
    pub poll_interval: Duration,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            navigation_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl AccessSettings {
    /// Settings for the browser variant: HTTP requests share the 15 second
    /// navigation bound.
    pub fn browser() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_NAVIGATION_TIMEOUT_SECS),
            ..Default::default()
        }
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the navigation timeout.
    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }
}

// ============================================================================
// Access Context
// ============================================================================

/// Context passed to authenticators and the stall fetcher.
#[derive(Debug)]
pub struct AccessContext {
    /// HTTP client with tracing.
    pub http: Arc<HttpClient>,
    /// Run settings.
    pub settings: AccessSettings,
}

impl AccessContext {
    /// Creates a context with default settings.
    pub fn new() -> Result<Self, HttpError> {
        Self::builder().build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> AccessContextBuilder {
        AccessContextBuilder::new()
    }

    /// Returns the HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.settings.request_timeout
    }
}

// ============================================================================
// Access Context Builder
// ============================================================================

/// Builder for constructing an `AccessContext`.
#[derive(Debug, Default)]
pub struct AccessContextBuilder {
    http: Option<Arc<HttpClient>>,
    settings: AccessSettings,
}

impl AccessContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP client. Its own timeout wins over the settings.
    #[must_use]
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the run settings.
    #[must_use]
    pub fn settings(mut self, settings: AccessSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.request_timeout = timeout;
        self
    }

    /// Builds the context, creating an HTTP client if none was supplied.
    pub fn build(self) -> Result<AccessContext, HttpError> {
        let http = match self.http {
            Some(http) => http,
            None => Arc::new(HttpClient::with_timeout(self.settings.request_timeout)?),
        };

        Ok(AccessContext {
            http,
            settings: self.settings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AccessSettings::default();
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.navigation_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_browser_settings_bound_requests() {
        let settings = AccessSettings::browser();
        assert_eq!(settings.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_context_builder_applies_timeout() {
        let ctx = AccessContext::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(ctx.request_timeout(), Duration::from_secs(5));
        assert_eq!(ctx.http.timeout(), Duration::from_secs(5));
    }
}
