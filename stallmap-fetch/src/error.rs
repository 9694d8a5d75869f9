//! Access error types.

use thiserror::Error;

// ============================================================================
// Main Access Error
// ============================================================================

/// Error type for a login-and-fetch run.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Connection failure or timeout.
    #[error("Network error: {0}")]
    Network(HttpError),

    /// Login failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The stalls endpoint answered 200 with a body that is not a stall array.
    #[error("Failed to decode stall data: {0}")]
    Decode(String),

    /// The stalls endpoint answered with a non-200 status.
    #[error("Failed to fetch stalls: HTTP {status}: {body}")]
    Fetch {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Browser launch or page driver failure.
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// The authenticator cannot run on this machine.
    #[error("Authenticator not available: {0}")]
    Unavailable(String),
}

// A token that cannot be encoded as a header is a login problem, not a
// transport one.
impl From<HttpError> for AccessError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::InvalidHeader(reason) => AccessError::Auth(AuthError::UnusableToken(reason)),
            other => AccessError::Network(other),
        }
    }
}

// ============================================================================
// Auth Error
// ============================================================================

/// Why a login did not produce a token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login endpoint answered with a non-200 status.
    #[error("login rejected with HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Login endpoint answered 200 with a body that is not JSON.
    #[error("login response is not valid JSON: {0}")]
    Malformed(String),

    /// Login succeeded but none of the token keys were present.
    #[error("login succeeded but no token found in response (keys: {})", .keys.join(", "))]
    MissingToken {
        /// Top-level keys the response did carry.
        keys: Vec<String>,
    },

    /// The token cannot be sent in an `Authorization` header.
    #[error("token is not a valid header value: {0}")]
    UnusableToken(String),

    /// The browser login form did not reach the dashboard.
    #[error("{0}")]
    Handshake(HandshakeFailure),
}

/// Terminal failure of the browser login handshake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeFailure {
    /// The login page rendered an alert.
    #[error("server returned: {0}")]
    Alert(String),

    /// The page never reached the dashboard and showed no alert.
    #[error("unexpected redirect to: {0}")]
    UnexpectedUrl(String),

    /// Dashboard reached but `localStorage` held no token.
    #[error("token not found in localStorage")]
    TokenNotFound,
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(reqwest::Error),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,

    /// Header value could not be encoded.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Request(err)
        }
    }
}

// ============================================================================
// Browser Error
// ============================================================================

/// Error type for browser operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No Chromium executable could be located.
    #[error("No Chromium executable found (tried: {0})")]
    NotFound(String),

    /// Browser process failed to start.
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    /// Selector matched nothing.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// DevTools protocol failure.
    #[error("DevTools protocol error: {0}")]
    Cdp(String),

    /// In-page script returned something unexpected.
    #[error("Script error: {0}")]
    Script(String),
}

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        BrowserError::Cdp(err.to_string())
    }
}
