//! Host APIs for `StallMap` authenticators.
//!
//! - [`http`] - HTTP client with tracing and a per-client timeout
//! - [`browser`] - Page driver abstraction and its Chromium implementation

pub mod browser;
pub mod http;

pub use browser::{ChromeLauncher, LoginPage, PageLauncher};
pub use http::HttpClient;
