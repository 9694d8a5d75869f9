//! Session types: what a run logs in with and what it gets back.

use std::fmt;

use url::Url;

use crate::error::CoreError;

/// Default backend serving the REST API.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Default frontend serving the employee login page.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Number of token characters shown by [`SessionToken::preview`].
const TOKEN_PREVIEW_CHARS: usize = 40;

// ============================================================================
// Base URL
// ============================================================================

/// A validated service root without a trailing slash.
///
/// Endpoint URLs are built by appending an absolute path, so
/// `http://host:8080/` and `http://host:8080` behave the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Parses and normalizes a base URL.
    ///
    /// Surrounding whitespace and trailing slashes are stripped. The URL must
    /// be absolute and carry a host.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let trimmed = input.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(CoreError::MissingInput("base URL"));
        }

        let parsed = Url::parse(trimmed).map_err(|e| CoreError::InvalidUrl {
            url: input.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.host_str().is_none() {
            return Err(CoreError::InvalidUrl {
                url: input.to_string(),
                reason: "no host in URL".to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Parses `input`, falling back to `default` when it is blank.
    pub fn parse_or(input: &str, default: &str) -> Result<Self, CoreError> {
        if input.trim().is_empty() {
            Self::parse(default)
        } else {
            Self::parse(input)
        }
    }

    /// Appends an absolute endpoint path (e.g. `/api/employee/stalls`).
    pub fn join(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.0, path)
        } else {
            format!("{}/{}", self.0, path)
        }
    }

    /// Returns the normalized URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Employee login credentials.
///
/// The password is never printed: `Debug` redacts it and there is no
/// `Display` impl.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login email.
    pub email: String,
    password: String,
}

impl Credentials {
    /// Creates credentials, trimming the email.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, CoreError> {
        let email = email.into().trim().to_string();
        let password = password.into();

        if email.is_empty() {
            return Err(CoreError::MissingInput("email"));
        }
        if password.is_empty() {
            return Err(CoreError::MissingInput("password"));
        }

        Ok(Self { email, password })
    }

    /// Returns the password for building a login request.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Session Token
// ============================================================================

/// Bearer token obtained from a login. Lives for one run and is never
/// written to disk.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a token string. Returns `None` for blank input.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Returns the full token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns a truncated prefix, safe for diagnostics.
    pub fn preview(&self) -> String {
        let prefix: String = self.0.chars().take(TOKEN_PREVIEW_CHARS).collect();
        if prefix.len() < self.0.len() {
            format!("{prefix}...")
        } else {
            prefix
        }
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({} chars)", self.0.chars().count())
    }
}

// ============================================================================
// Access Request
// ============================================================================

/// Everything a run needs before it authenticates.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    /// REST API root (login and stalls endpoints).
    pub backend: BaseUrl,
    /// Web frontend root (login page, browser variant only).
    pub frontend: BaseUrl,
    /// Employee credentials.
    pub credentials: Credentials,
    /// Run the browser without a window.
    pub headless: bool,
}

impl AccessRequest {
    /// Creates a request against the default frontend, headless.
    pub fn new(backend: BaseUrl, credentials: Credentials) -> Self {
        Self {
            backend,
            frontend: BaseUrl(DEFAULT_FRONTEND_URL.to_string()),
            credentials,
            headless: true,
        }
    }

    /// Sets the frontend root.
    #[must_use]
    pub fn with_frontend(mut self, frontend: BaseUrl) -> Self {
        self.frontend = frontend;
        self
    }

    /// Sets headless mode.
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
