//! Trait definitions for `StallMap`.

use crate::error::CoreError;
use crate::models::AccessRequest;

/// Somewhere an [`AccessRequest`] can be collected from.
///
/// The run pipeline does not care whether the URLs and credentials were
/// typed in at a prompt or fixed ahead of time; both go through this trait.
pub trait CredentialSource {
    /// Short name for logs (e.g. "interactive", "static").
    fn name(&self) -> &'static str;

    /// Collects the request. Called once per run.
    fn collect(&mut self) -> Result<AccessRequest, CoreError>;
}

/// A source whose answer is fixed at construction (flags, environment,
/// config file).
#[derive(Debug, Clone)]
pub struct StaticSource {
    request: AccessRequest,
}

impl StaticSource {
    /// Wraps a ready request.
    pub fn new(request: AccessRequest) -> Self {
        Self { request }
    }
}

impl CredentialSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn collect(&mut self) -> Result<AccessRequest, CoreError> {
        Ok(self.request.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BaseUrl, Credentials, DEFAULT_BACKEND_URL};

    #[test]
    fn test_static_source_returns_request() {
        let request = AccessRequest::new(
            BaseUrl::parse(DEFAULT_BACKEND_URL).unwrap(),
            Credentials::new("emp1@example.com", "password123").unwrap(),
        );
        let mut source = StaticSource::new(request);

        let collected = source.collect().unwrap();
        assert_eq!(source.name(), "static");
        assert_eq!(collected.credentials.email, "emp1@example.com");
        assert_eq!(collected.backend.as_str(), DEFAULT_BACKEND_URL);
        assert!(collected.headless);
    }
}
