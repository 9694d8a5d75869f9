//! Direct REST login.
//!
//! `POST {backend}/api/auth/signin` with `{"email", "password"}`. The token is
//! taken from the first of [`TOKEN_KEYS`] that holds a non-empty string.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use stallmap_core::{AccessRequest, SessionToken};
use tracing::{debug, info, instrument, warn};

use crate::context::AccessContext;
use crate::error::{AccessError, AuthError};
use crate::strategy::{AuthKind, Authenticator};

/// Login endpoint path.
pub const SIGNIN_PATH: &str = "/api/auth/signin";

/// Response keys that may carry the token, highest priority first.
pub const TOKEN_KEYS: [&str; 3] = ["token", "accessToken", "jwt"];

// ============================================================================
// Token Extraction
// ============================================================================

/// Picks the token out of a login response.
///
/// The first key in [`TOKEN_KEYS`] whose value is a non-empty string wins.
/// Non-string values are skipped.
pub fn extract_token(body: &Value) -> Option<SessionToken> {
    TOKEN_KEYS
        .iter()
        .filter_map(|key| body.get(key).and_then(Value::as_str))
        .find_map(SessionToken::new)
}

fn top_level_keys(body: &Value) -> Vec<String> {
    body.as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

// ============================================================================
// API Authenticator
// ============================================================================

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Logs in by posting credentials to the REST API.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiAuthenticator;

impl ApiAuthenticator {
    /// Creates a new API authenticator.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for ApiAuthenticator {
    fn id(&self) -> &str {
        "signin.api"
    }

    fn kind(&self) -> AuthKind {
        AuthKind::Api
    }

    async fn is_available(&self, _ctx: &AccessContext) -> bool {
        true
    }

    #[instrument(skip(self, ctx, request), fields(email = %request.credentials.email))]
    async fn authenticate(
        &self,
        ctx: &AccessContext,
        request: &AccessRequest,
    ) -> Result<SessionToken, AccessError> {
        let url = request.backend.join(SIGNIN_PATH);
        info!(url = %url, "Logging in");

        let body = SignInRequest {
            email: &request.credentials.email,
            password: request.credentials.password(),
        };

        let response = ctx.http.post_json(&url, &body).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AccessError::Network(e.into()))?;

        if status != StatusCode::OK {
            warn!(status = %status, "Login rejected");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let value: Value =
            serde_json::from_str(&text).map_err(|e| AuthError::Malformed(e.to_string()))?;

        let token = extract_token(&value).ok_or_else(|| AuthError::MissingToken {
            keys: top_level_keys(&value),
        })?;

        debug!(token = %token.preview(), "Token acquired");
        info!("Login successful");
        Ok(token)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_access_token_only() {
        let token = extract_token(&json!({"accessToken": "abc"})).unwrap();
        assert_eq!(token.expose(), "abc");
    }

    #[test]
    fn test_extract_prefers_token_key() {
        let body = json!({"jwt": "third", "accessToken": "second", "token": "first"});
        assert_eq!(extract_token(&body).unwrap().expose(), "first");
    }

    #[test]
    fn test_extract_skips_empty_and_non_string() {
        let body = json!({"token": "", "accessToken": 12345, "jwt": "from-jwt"});
        assert_eq!(extract_token(&body).unwrap().expose(), "from-jwt");
    }

    #[test]
    fn test_extract_none_when_no_candidate() {
        assert!(extract_token(&json!({"user": {"token": "nested"}})).is_none());
        assert!(extract_token(&json!(["token"])).is_none());
        assert!(extract_token(&json!(null)).is_none());
    }

    #[test]
    fn test_top_level_keys() {
        let mut keys = top_level_keys(&json!({"user": 1, "expiresAt": 2}));
        keys.sort();
        assert_eq!(keys, vec!["expiresAt", "user"]);
        assert!(top_level_keys(&json!("x")).is_empty());
    }

    #[test]
    fn test_signin_body_shape() {
        let body = SignInRequest {
            email: "emp1@example.com",
            password: "password123",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"email": "emp1@example.com", "password": "password123"})
        );
    }

    #[test]
    fn test_authenticator_identity() {
        let auth = ApiAuthenticator::new();
        assert_eq!(auth.id(), "signin.api");
        assert_eq!(auth.kind(), AuthKind::Api);
        assert_eq!(auth.display_name(), "signin.api (API)");
    }
}
