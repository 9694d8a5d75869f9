//! Browser page driver for the login form.
//!
//! The login handshake only needs a handful of page operations, so they are
//! expressed as the [`LoginPage`] trait. [`ChromePage`] implements it over
//! the Chrome DevTools Protocol; tests use scripted fakes.
//!
//! ## Lifecycle
//!
//! A page owns its browser process. [`LoginPage::close`] shuts the process
//! down; dropping a [`ChromePage`] without closing it stops the event handler
//! and the browser process is killed on drop.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

use crate::error::BrowserError;

/// Executable names tried, in order, when no path is configured.
pub const CHROME_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

// ============================================================================
// Page Driver Traits
// ============================================================================

/// The page operations the login handshake performs.
///
/// Calls are made one at a time; implementations never see two in flight.
#[async_trait]
pub trait LoginPage: Send {
    /// Navigates to `url` and waits for the page to finish loading.
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Types `value` into the input matched by `selector`.
    ///
    /// Fails with [`BrowserError::ElementNotFound`] when nothing matches yet.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), BrowserError>;

    /// Clicks the element matched by `selector`.
    async fn click(&mut self, selector: &str) -> Result<(), BrowserError>;

    /// Returns the page's current URL.
    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Returns the trimmed text of the first element matched by `selector`,
    /// or `None` if nothing matches or the text is empty.
    async fn first_text(&mut self, selector: &str) -> Result<Option<String>, BrowserError>;

    /// Reads `localStorage[key]`. Missing and empty values are `None`.
    async fn local_storage_item(&mut self, key: &str) -> Result<Option<String>, BrowserError>;

    /// Shuts the browser down. Called exactly once per page.
    async fn close(&mut self) -> Result<(), BrowserError>;
}

/// Starts browsers and hands out pages.
#[async_trait]
pub trait PageLauncher: Send + Sync {
    /// Quick, offline check that a browser can be launched.
    fn is_available(&self) -> bool;

    /// Launches a browser with one blank page.
    async fn launch(&self, headless: bool) -> Result<Box<dyn LoginPage>, BrowserError>;
}

// ============================================================================
// Chrome Launcher
// ============================================================================

/// Launches a local Chromium over the DevTools protocol.
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher {
    executable: Option<PathBuf>,
}

impl ChromeLauncher {
    /// Creates a launcher that searches `PATH` for Chromium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a launcher for a specific executable.
    pub fn with_executable(path: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(path.into()),
        }
    }

    /// Resolves the executable to launch.
    ///
    /// A configured path wins if it exists; otherwise [`CHROME_CANDIDATES`]
    /// are looked up on `PATH`.
    pub fn locate(&self) -> Option<PathBuf> {
        if let Some(path) = &self.executable {
            if path.exists() {
                return Some(path.clone());
            }
            if let Ok(found) = which::which(path) {
                return Some(found);
            }
            warn!(path = %path.display(), "Configured browser executable not found");
            return None;
        }

        CHROME_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
    }
}

#[async_trait]
impl PageLauncher for ChromeLauncher {
    fn is_available(&self) -> bool {
        self.locate().is_some()
    }

    #[instrument(skip(self))]
    async fn launch(&self, headless: bool) -> Result<Box<dyn LoginPage>, BrowserError> {
        let executable = self.locate().ok_or_else(|| match &self.executable {
            Some(path) => BrowserError::NotFound(path.display().to_string()),
            None => BrowserError::NotFound(CHROME_CANDIDATES.join(", ")),
        })?;
        debug!(executable = %executable.display(), "Launching browser");

        let mut builder = BrowserConfig::builder().chrome_executable(executable);
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!(error = %e, "CDP handler error");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(e.into());
            }
        };

        Ok(Box::new(ChromePage {
            browser,
            page,
            handler,
            closed: false,
        }))
    }
}

// ============================================================================
// Chrome Page
// ============================================================================

/// A Chromium tab plus the browser process that owns it.
pub struct ChromePage {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    closed: bool,
}

impl ChromePage {
    /// First match for `selector`. No match is `ElementNotFound`; protocol
    /// failures stay `Cdp`.
    async fn element(&self, selector: &str) -> Result<chromiumoxide::Element, BrowserError> {
        self.page
            .find_elements(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::ElementNotFound(selector.to_string()))
    }
}

#[async_trait]
impl LoginPage for ChromePage {
    #[instrument(skip(self))]
    async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
        // Resolves once the load event fires.
        self.page.goto(url).await?;
        Ok(())
    }

    #[instrument(skip(self, value))]
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), BrowserError> {
        let element = self.element(selector).await?;
        element.click().await?;
        element.type_str(value).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        self.element(selector).await?.click().await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn first_text(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        let elements = self.page.find_elements(selector).await?;
        let Some(element) = elements.first() else {
            return Ok(None);
        };

        Ok(element
            .inner_text()
            .await?
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty()))
    }

    async fn local_storage_item(&mut self, key: &str) -> Result<Option<String>, BrowserError> {
        // `?? ""` keeps the result a string; a bare `null` comes back valueless.
        let key = serde_json::to_string(key).map_err(|e| BrowserError::Script(e.to_string()))?;
        let script = format!("window.localStorage.getItem({key}) ?? \"\"");

        let value: String = self
            .page
            .evaluate(script)
            .await?
            .into_value()
            .map_err(|e| BrowserError::Script(e.to_string()))?;

        Ok(Some(value).filter(|v| !v.is_empty()))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Browser process did not exit cleanly");
        }
        self.handler.abort();

        debug!("Browser closed");
        result.map(|_| ()).map_err(Into::into)
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

// ============================================================================
// Tests
// ============================================================================
