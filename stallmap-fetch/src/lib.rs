// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `StallMap` Fetch
//!
//! Authentication and stall retrieval against the employee stall service.
//!
//! ## Host APIs
//!
//! The [`host`] module wraps the outside world:
//!
//! - [`host::http`] - HTTP client with tracing and a per-client timeout
//! - [`host::browser`] - Chromium page driver for the login form
//!
//! ## Access Pipeline
//!
//! A run is one login followed by one stalls request:
//!
//! - [`strategy::Authenticator`] - Trait for login implementations
//! - [`auth::ApiAuthenticator`] - `POST /api/auth/signin`
//! - [`handshake::BrowserAuthenticator`] - Login form driven in a browser
//! - [`stalls::StallFetcher`] - `GET /api/employee/stalls`
//! - [`pipeline::AccessPipeline`] - Runs login then fetch, never fetch alone
//!
//! ## Example
//!
//! ```ignore
//! use stallmap_fetch::{AccessContext, AccessPipeline, ApiAuthenticator, StallFetcher};
//!
//! let ctx = AccessContext::new()?;
//! let pipeline = AccessPipeline::new(
//!     Box::new(ApiAuthenticator::new()),
//!     Box::new(StallFetcher::new(ctx.http.clone())),
//! );
//!
//! let outcome = pipeline.execute(&ctx, &request).await?;
//! println!("{} stalls", outcome.stalls.len());
//! ```

pub mod auth;
pub mod context;
pub mod error;
pub mod handshake;
pub mod host;
pub mod pipeline;
pub mod stalls;
pub mod strategy;

// Errors
pub use error::{AccessError, AuthError, BrowserError, HandshakeFailure, HttpError};

// Host APIs
pub use host::{
    browser::{ChromeLauncher, LoginPage, PageLauncher},
    http::HttpClient,
};

// Authenticators
pub use auth::{extract_token, ApiAuthenticator, TOKEN_KEYS};
pub use handshake::{BrowserAuthenticator, Handshake, HandshakeConfig, HandshakeState, UrlPattern};

// Fetch & Pipeline
pub use context::{AccessContext, AccessContextBuilder, AccessSettings};
pub use pipeline::{AccessOutcome, AccessPipeline};
pub use stalls::{StallFetcher, StallSource};
pub use strategy::{AuthKind, Authenticator};
