//! Authenticator trait and types.
//!
//! An authenticator turns an [`AccessRequest`] into a [`SessionToken`].
//! There are two: a direct REST login and a browser-driven login form.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stallmap_core::{AccessRequest, SessionToken};
use std::fmt;

use crate::context::AccessContext;
use crate::error::AccessError;

// ============================================================================
// Auth Kind
// ============================================================================

/// The mechanism an authenticator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// `POST /api/auth/signin` with JSON credentials.
    Api,
    /// Login form submitted in a real browser.
    Browser,
}

impl AuthKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::Browser => "Browser",
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Authenticator Trait
// ============================================================================

/// A way of logging in to the stall service.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Unique identifier (e.g. "signin.api", "signin.browser").
    fn id(&self) -> &str;

    /// The kind of login this authenticator performs.
    fn kind(&self) -> AuthKind;

    /// Human-readable name.
    fn display_name(&self) -> String {
        format!("{} ({})", self.id(), self.kind().display_name())
    }

    /// Quick, offline check that this authenticator can run here.
    async fn is_available(&self, ctx: &AccessContext) -> bool;

    /// Logs in and returns the bearer token.
    async fn authenticate(
        &self,
        ctx: &AccessContext,
        request: &AccessRequest,
    ) -> Result<SessionToken, AccessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_kind_display() {
        assert_eq!(AuthKind::Api.to_string(), "API");
        assert_eq!(AuthKind::Browser.display_name(), "Browser");
    }

    #[test]
    fn test_auth_kind_serde() {
        assert_eq!(serde_json::to_string(&AuthKind::Browser).unwrap(), r#""browser""#);
    }
}
