//! Access pipeline: one login, then one stalls request.
//!
//! The stall source is only consulted after the authenticator returned a
//! token. There is no fallback and no retry; the first error ends the run.

use stallmap_core::{AccessRequest, StallMap};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::context::AccessContext;
use crate::error::AccessError;
use crate::stalls::StallSource;
use crate::strategy::{AuthKind, Authenticator};

// ============================================================================
// Access Outcome
// ============================================================================

/// The result of a successful run.
#[derive(Debug)]
pub struct AccessOutcome {
    /// Stalls as returned by the server.
    pub stalls: StallMap,
    /// The authenticator that produced the token.
    pub authenticator_id: String,
    /// The kind of login used.
    pub kind: AuthKind,
    /// Time spent logging in.
    pub login_duration: Duration,
    /// Time spent fetching stalls.
    pub fetch_duration: Duration,
}

impl AccessOutcome {
    /// Total time for the run.
    pub fn duration(&self) -> Duration {
        self.login_duration + self.fetch_duration
    }
}

// ============================================================================
// Access Pipeline
// ============================================================================

/// Login followed by stall retrieval.
pub struct AccessPipeline {
    authenticator: Box<dyn Authenticator>,
    stalls: Box<dyn StallSource>,
}

impl AccessPipeline {
    /// Creates a pipeline.
    pub fn new(authenticator: Box<dyn Authenticator>, stalls: Box<dyn StallSource>) -> Self {
        Self {
            authenticator,
            stalls,
        }
    }

    /// The authenticator this pipeline logs in with.
    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    /// Logs in, then fetches stalls with the token.
    #[instrument(skip(self, ctx, request), fields(authenticator = %self.authenticator.id()))]
    pub async fn execute(
        &self,
        ctx: &AccessContext,
        request: &AccessRequest,
    ) -> Result<AccessOutcome, AccessError> {
        let id = self.authenticator.id().to_string();
        let kind = self.authenticator.kind();

        if !self.authenticator.is_available(ctx).await {
            warn!(authenticator = %id, "Authenticator not available");
            return Err(AccessError::Unavailable(self.authenticator.display_name()));
        }

        let login_start = Instant::now();
        let token = self.authenticator.authenticate(ctx, request).await?;
        let login_duration = login_start.elapsed();
        debug!(duration = ?login_duration, "Login finished");

        let fetch_start = Instant::now();
        let stalls = self.stalls.fetch_stalls(&request.backend, &token).await?;
        let fetch_duration = fetch_start.elapsed();

        info!(
            stalls = stalls.len(),
            duration = ?(login_duration + fetch_duration),
            "Access succeeded"
        );

        Ok(AccessOutcome {
            stalls,
            authenticator_id: id,
            kind,
            login_duration,
            fetch_duration,
        })
    }
}

impl std::fmt::Debug for AccessPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessPipeline")
            .field("authenticator", &self.authenticator.id())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
