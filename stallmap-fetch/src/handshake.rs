//! Browser-driven login handshake.
//!
//! The login form is driven as an explicit state machine:
//!
//! ```text
//! NavigatingToLogin -> Filling -> Submitting -+-> Succeeded -+-> token
//!                                             |              |
//!                                             +-> Failed <---+
//! ```
//!
//! The form is rendered client-side, so filling and clicking retry while
//! their element is missing, up to the element timeout.
//!
//! `Submitting` moves to `Succeeded` only when the page URL matches the
//! dashboard pattern before the navigation timeout. `Succeeded` moves to
//! `Failed` when `localStorage` holds no token. The page is closed exactly
//! once whichever way the machine ends.

use async_trait::async_trait;
use regex::Regex;
use stallmap_core::{AccessRequest, Credentials, SessionToken};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

use crate::context::AccessContext;
use crate::error::{AccessError, AuthError, BrowserError, HandshakeFailure};
use crate::host::browser::{LoginPage, PageLauncher};
use crate::strategy::{AuthKind, Authenticator};

/// Login page path on the frontend.
pub const LOGIN_PATH: &str = "/employee/login";

/// URL the frontend redirects to after a successful login.
pub const DASHBOARD_PATTERN: &str = "**/employee/dashboard";

/// Email input.
pub const EMAIL_SELECTOR: &str = r#"input[name="email"]"#;

/// Password input.
pub const PASSWORD_SELECTOR: &str = r#"input[name="password"]"#;

/// Submit control.
pub const SUBMIT_SELECTOR: &str = r#"button[type="submit"]"#;

/// Error banner rendered by the login page.
pub const ALERT_SELECTOR: &str = r#"[role="alert"]"#;

/// `localStorage` key the frontend keeps the token under.
pub const TOKEN_STORAGE_KEY: &str = "token";

// ============================================================================
// URL Pattern
// ============================================================================

/// A URL glob: `**` matches anything, `*` matches anything but `/`.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    glob: String,
    regex: Regex,
}

impl UrlPattern {
    /// Compiles a glob. The whole URL must match.
    pub fn glob(glob: &str) -> Result<Self, regex::Error> {
        let mut pattern = String::from("^");
        let mut chars = glob.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '*' {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    pattern.push_str(".*");
                } else {
                    pattern.push_str("[^/]*");
                }
            } else {
                pattern.push_str(&regex::escape(&c.to_string()));
            }
        }
        pattern.push('$');

        Ok(Self {
            glob: glob.to_string(),
            regex: Regex::new(&pattern)?,
        })
    }

    /// The dashboard redirect pattern.
    pub fn dashboard() -> Self {
        // Escaped literals plus `.*` / `[^/]*` always compile.
        Self::glob(DASHBOARD_PATTERN).unwrap_or_else(|e| unreachable!("{e}"))
    }

    /// Returns true if `url` matches.
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// The glob this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

// ============================================================================
// Handshake State Machine
// ============================================================================

/// Where the handshake is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    /// Opening the login page.
    NavigatingToLogin,
    /// Typing credentials.
    Filling,
    /// Submitted; waiting for the dashboard redirect.
    Submitting,
    /// On the dashboard; reading the token.
    Succeeded,
    /// Terminal failure.
    Failed(HandshakeFailure),
}

/// Bounds for the handshake.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// How long to wait for the dashboard URL after submitting.
    pub navigation_timeout: Duration,
    /// How long a form element may take to appear.
    pub element_timeout: Duration,
    /// How often to re-read the page URL while waiting.
    pub poll_interval: Duration,
    /// Where a successful login lands.
    pub dashboard: UrlPattern,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self::from_settings(&crate::context::AccessSettings::default())
    }
}

impl HandshakeConfig {
    /// Takes the timeouts from run settings.
    pub fn from_settings(settings: &crate::context::AccessSettings) -> Self {
        Self {
            navigation_timeout: settings.navigation_timeout,
            element_timeout: settings.navigation_timeout,
            poll_interval: settings.poll_interval,
            dashboard: UrlPattern::dashboard(),
        }
    }
}

enum Step {
    Next(HandshakeState),
    Done(SessionToken),
}

#[derive(Clone, Copy)]
enum FormAction<'v> {
    Fill(&'v str),
    Click,
}

enum Redirect {
    Dashboard(String),
    Stuck(String),
}

/// One run of the login form.
#[derive(Debug)]
pub struct Handshake<'a> {
    login_url: String,
    credentials: &'a Credentials,
    config: HandshakeConfig,
    state: HandshakeState,
    history: Vec<HandshakeState>,
}

impl<'a> Handshake<'a> {
    /// Creates a handshake for the given login page.
    pub fn new(login_url: impl Into<String>, credentials: &'a Credentials, config: HandshakeConfig) -> Self {
        Self {
            login_url: login_url.into(),
            credentials,
            config,
            state: HandshakeState::NavigatingToLogin,
            history: vec![HandshakeState::NavigatingToLogin],
        }
    }

    /// Current state.
    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    /// Every state entered so far, in order.
    pub fn history(&self) -> &[HandshakeState] {
        &self.history
    }

    /// Drives the page to a terminal state, then closes it.
    ///
    /// The page is closed exactly once on every path, including driver
    /// errors. A close failure is logged and does not mask the outcome.
    pub async fn run(&mut self, mut page: Box<dyn LoginPage>) -> Result<SessionToken, AccessError> {
        let outcome = self.drive(page.as_mut()).await;

        if let Err(e) = page.close().await {
            warn!(error = %e, "Failed to close browser");
        }

        outcome
    }

    /// Steps the machine until it yields a token or fails.
    async fn drive(&mut self, page: &mut dyn LoginPage) -> Result<SessionToken, AccessError> {
        loop {
            match self.step(page).await? {
                Step::Next(next) => self.transition(next),
                Step::Done(token) => return Ok(token),
            }
        }
    }

    fn transition(&mut self, next: HandshakeState) {
        debug!(from = ?self.state, to = ?next, "Handshake transition");
        self.state = next.clone();
        self.history.push(next);
    }

    async fn step(&self, page: &mut dyn LoginPage) -> Result<Step, AccessError> {
        match &self.state {
            HandshakeState::NavigatingToLogin => {
                info!(url = %self.login_url, "Opening login page");
                page.goto(&self.login_url).await?;
                Ok(Step::Next(HandshakeState::Filling))
            }
            HandshakeState::Filling => {
                debug!("Filling credentials");
                self.on_element(page, EMAIL_SELECTOR, FormAction::Fill(&self.credentials.email))
                    .await?;
                self.on_element(page, PASSWORD_SELECTOR, FormAction::Fill(self.credentials.password()))
                    .await?;
                Ok(Step::Next(HandshakeState::Submitting))
            }
            HandshakeState::Submitting => {
                debug!("Submitting login form");
                self.on_element(page, SUBMIT_SELECTOR, FormAction::Click).await?;

                match self.wait_for_dashboard(page).await? {
                    Redirect::Dashboard(url) => {
                        info!(url = %url, "Logged in");
                        Ok(Step::Next(HandshakeState::Succeeded))
                    }
                    Redirect::Stuck(url) => {
                        let failure = match page.first_text(ALERT_SELECTOR).await? {
                            Some(text) => HandshakeFailure::Alert(text),
                            None => HandshakeFailure::UnexpectedUrl(url),
                        };
                        Ok(Step::Next(HandshakeState::Failed(failure)))
                    }
                }
            }
            HandshakeState::Succeeded => {
                match page
                    .local_storage_item(TOKEN_STORAGE_KEY)
                    .await?
                    .and_then(SessionToken::new)
                {
                    Some(token) => {
                        debug!(token = %token.preview(), "Token read from localStorage");
                        Ok(Step::Done(token))
                    }
                    None => Ok(Step::Next(HandshakeState::Failed(
                        HandshakeFailure::TokenNotFound,
                    ))),
                }
            }
            HandshakeState::Failed(reason) => {
                warn!(reason = %reason, "Browser login failed");
                Err(AuthError::Handshake(reason.clone()).into())
            }
        }
    }

    /// Runs a form action, retrying while its element has not rendered.
    async fn on_element(
        &self,
        page: &mut dyn LoginPage,
        selector: &str,
        action: FormAction<'_>,
    ) -> Result<(), AccessError> {
        let deadline = Instant::now() + self.config.element_timeout;

        loop {
            let result = match action {
                FormAction::Fill(value) => page.fill(selector, value).await,
                FormAction::Click => page.click(selector).await,
            };

            match result {
                Err(BrowserError::ElementNotFound(_)) if Instant::now() < deadline => {
                    trace!(selector, "Waiting for element");
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                other => return other.map_err(Into::into),
            }
        }
    }

    /// Polls the page URL until it matches the dashboard or time runs out.
    async fn wait_for_dashboard(&self, page: &mut dyn LoginPage) -> Result<Redirect, AccessError> {
        let deadline = Instant::now() + self.config.navigation_timeout;

        loop {
            let url = page.current_url().await?;
            if self.config.dashboard.matches(&url) {
                return Ok(Redirect::Dashboard(url));
            }
            if Instant::now() >= deadline {
                debug!(url = %url, pattern = %self.config.dashboard.as_str(), "Redirect timed out");
                return Ok(Redirect::Stuck(url));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}

// ============================================================================
// Browser Authenticator
// ============================================================================

/// Logs in through the frontend's login form in a real browser.
pub struct BrowserAuthenticator {
    launcher: Arc<dyn PageLauncher>,
}

impl BrowserAuthenticator {
    /// Creates an authenticator on the given launcher.
    pub fn new(launcher: Arc<dyn PageLauncher>) -> Self {
        Self { launcher }
    }
}

impl std::fmt::Debug for BrowserAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserAuthenticator").finish_non_exhaustive()
    }
}

#[async_trait]
impl Authenticator for BrowserAuthenticator {
    fn id(&self) -> &str {
        "signin.browser"
    }

    fn kind(&self) -> AuthKind {
        AuthKind::Browser
    }

    async fn is_available(&self, _ctx: &AccessContext) -> bool {
        self.launcher.is_available()
    }

    #[instrument(skip(self, ctx, request), fields(email = %request.credentials.email, headless = request.headless))]
    async fn authenticate(
        &self,
        ctx: &AccessContext,
        request: &AccessRequest,
    ) -> Result<SessionToken, AccessError> {
        let page = self.launcher.launch(request.headless).await?;
        let config = HandshakeConfig::from_settings(&ctx.settings);

        Handshake::new(request.frontend.join(LOGIN_PATH), &request.credentials, config)
            .run(page)
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const LOGIN_URL: &str = "http://localhost:5173/employee/login";
    const DASHBOARD_URL: &str = "http://localhost:5173/employee/dashboard";

    /// A page that replays scripted answers and records what was done to it.
    #[derive(Default)]
    struct ScriptedPage {
        /// URLs returned by successive `current_url` calls; the last repeats.
        urls: Vec<String>,
        url_reads: usize,
        alert: Option<String>,
        token: Option<String>,
        fail_goto: bool,
        /// Lookups that miss before the form shows up.
        render_delay: usize,
        lookups: usize,
        /// Driver failure for the alert lookup.
        alert_error: Option<String>,
        actions: Arc<Mutex<Vec<String>>>,
        closes: Arc<AtomicUsize>,
    }

    impl ScriptedPage {
        fn redirecting_to(url: &str) -> Self {
            Self {
                urls: vec![LOGIN_URL.to_string(), url.to_string()],
                ..Default::default()
            }
        }

        fn record(&self, action: String) {
            self.actions.lock().unwrap().push(action);
        }

        fn find(&mut self, selector: &str) -> Result<(), BrowserError> {
            self.lookups += 1;
            if self.lookups <= self.render_delay {
                return Err(BrowserError::ElementNotFound(selector.to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LoginPage for ScriptedPage {
        async fn goto(&mut self, url: &str) -> Result<(), BrowserError> {
            self.record(format!("goto {url}"));
            if self.fail_goto {
                return Err(BrowserError::Cdp("net::ERR_CONNECTION_REFUSED".to_string()));
            }
            Ok(())
        }

        async fn fill(&mut self, selector: &str, value: &str) -> Result<(), BrowserError> {
            self.find(selector)?;
            self.record(format!("fill {selector}={value}"));
            Ok(())
        }

        async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
            self.find(selector)?;
            self.record(format!("click {selector}"));
            Ok(())
        }

        async fn current_url(&mut self) -> Result<String, BrowserError> {
            let index = self.url_reads.min(self.urls.len().saturating_sub(1));
            self.url_reads += 1;
            Ok(self.urls.get(index).cloned().unwrap_or_default())
        }

        async fn first_text(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
            assert_eq!(selector, ALERT_SELECTOR);
            if let Some(error) = &self.alert_error {
                return Err(BrowserError::Cdp(error.clone()));
            }
            Ok(self.alert.clone())
        }

        async fn local_storage_item(&mut self, key: &str) -> Result<Option<String>, BrowserError> {
            assert_eq!(key, TOKEN_STORAGE_KEY);
            Ok(self.token.clone())
        }

        async fn close(&mut self) -> Result<(), BrowserError> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn fast_config() -> HandshakeConfig {
        HandshakeConfig {
            navigation_timeout: Duration::from_millis(50),
            element_timeout: Duration::from_millis(50),
            poll_interval: Duration::from_millis(5),
            dashboard: UrlPattern::dashboard(),
        }
    }

    fn credentials() -> Credentials {
        Credentials::new("emp1@example.com", "password123").unwrap()
    }

    #[test]
    fn test_dashboard_pattern_matches() {
        let pattern = UrlPattern::dashboard();
        assert!(pattern.matches(DASHBOARD_URL));
        assert!(pattern.matches("https://stalls.example.com/app/employee/dashboard"));
        assert!(!pattern.matches(LOGIN_URL));
        assert!(!pattern.matches("http://localhost:5173/employee/dashboard/settings"));
    }

    #[test]
    fn test_single_star_stops_at_slash() {
        let pattern = UrlPattern::glob("http://host/*/dashboard").unwrap();
        assert!(pattern.matches("http://host/employee/dashboard"));
        assert!(!pattern.matches("http://host/a/b/dashboard"));
    }

    #[test]
    fn test_glob_escapes_regex_characters() {
        let pattern = UrlPattern::glob("http://host/a.b?c").unwrap();
        assert!(pattern.matches("http://host/a.b?c"));
        assert!(!pattern.matches("http://host/aXb?c"));
    }

    #[tokio::test]
    async fn test_successful_handshake_yields_token() {
        let creds = credentials();
        let page = ScriptedPage {
            token: Some("eyJhbGciOiJIUzI1NiJ9.payload.sig".to_string()),
            ..ScriptedPage::redirecting_to(DASHBOARD_URL)
        };
        let actions = page.actions.clone();
        let closes = page.closes.clone();

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        let token = handshake.run(Box::new(page)).await.unwrap();

        assert_eq!(token.expose(), "eyJhbGciOiJIUzI1NiJ9.payload.sig");
        assert_eq!(
            handshake.history(),
            &[
                HandshakeState::NavigatingToLogin,
                HandshakeState::Filling,
                HandshakeState::Submitting,
                HandshakeState::Succeeded,
            ]
        );
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let actions = actions.lock().unwrap();
        assert_eq!(actions[0], format!("goto {LOGIN_URL}"));
        assert_eq!(actions[1], format!("fill {EMAIL_SELECTOR}=emp1@example.com"));
        assert_eq!(actions[2], format!("fill {PASSWORD_SELECTOR}=password123"));
        assert_eq!(actions[3], format!("click {SUBMIT_SELECTOR}"));
    }

    #[tokio::test]
    async fn test_timeout_without_alert_reports_url_and_closes_once() {
        let creds = credentials();
        let page = ScriptedPage {
            urls: vec![LOGIN_URL.to_string()],
            ..Default::default()
        };
        let closes = page.closes.clone();

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        let err = handshake.run(Box::new(page)).await.unwrap_err();

        let expected = HandshakeFailure::UnexpectedUrl(LOGIN_URL.to_string());
        assert_eq!(handshake.state(), &HandshakeState::Failed(expected.clone()));
        assert!(matches!(err, AccessError::Auth(AuthError::Handshake(f)) if f == expected));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_with_alert_surfaces_alert_text() {
        let creds = credentials();
        let page = ScriptedPage {
            urls: vec![LOGIN_URL.to_string()],
            alert: Some("Invalid email or password".to_string()),
            ..Default::default()
        };
        let closes = page.closes.clone();

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        let err = handshake.run(Box::new(page)).await.unwrap_err();

        assert_eq!(
            handshake.state(),
            &HandshakeState::Failed(HandshakeFailure::Alert("Invalid email or password".to_string()))
        );
        assert!(err.to_string().contains("Invalid email or password"));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_redirect_elsewhere_is_unexpected_url() {
        let creds = credentials();
        let page = ScriptedPage::redirecting_to("http://localhost:5173/vendor/home");

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        handshake.run(Box::new(page)).await.unwrap_err();

        assert_eq!(
            handshake.state(),
            &HandshakeState::Failed(HandshakeFailure::UnexpectedUrl(
                "http://localhost:5173/vendor/home".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_missing_token_after_redirect() {
        let creds = credentials();
        let page = ScriptedPage::redirecting_to(DASHBOARD_URL);
        let closes = page.closes.clone();

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        let err = handshake.run(Box::new(page)).await.unwrap_err();

        assert_eq!(
            handshake.history().last(),
            Some(&HandshakeState::Failed(HandshakeFailure::TokenNotFound))
        );
        assert!(err.to_string().contains("token not found"));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_token_counts_as_missing() {
        let creds = credentials();
        let page = ScriptedPage {
            token: Some("   ".to_string()),
            ..ScriptedPage::redirecting_to(DASHBOARD_URL)
        };

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        handshake.run(Box::new(page)).await.unwrap_err();

        assert_eq!(
            handshake.state(),
            &HandshakeState::Failed(HandshakeFailure::TokenNotFound)
        );
    }

    #[tokio::test]
    async fn test_driver_error_still_closes_browser() {
        let creds = credentials();
        let page = ScriptedPage {
            fail_goto: true,
            ..Default::default()
        };
        let closes = page.closes.clone();

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        let err = handshake.run(Box::new(page)).await.unwrap_err();

        assert!(matches!(err, AccessError::Browser(BrowserError::Cdp(_))));
        assert_eq!(handshake.state(), &HandshakeState::NavigatingToLogin);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fill_waits_for_form_to_render() {
        let creds = credentials();
        let page = ScriptedPage {
            token: Some("tok".to_string()),
            render_delay: 3,
            ..ScriptedPage::redirecting_to(DASHBOARD_URL)
        };
        let actions = page.actions.clone();

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        let token = handshake.run(Box::new(page)).await.unwrap();

        assert_eq!(token.expose(), "tok");
        let actions = actions.lock().unwrap();
        assert_eq!(actions[1], format!("fill {EMAIL_SELECTOR}=emp1@example.com"));
        assert_eq!(actions.len(), 4);
    }

    #[tokio::test]
    async fn test_form_that_never_renders_is_element_not_found() {
        let creds = credentials();
        let page = ScriptedPage {
            render_delay: usize::MAX,
            ..Default::default()
        };
        let closes = page.closes.clone();

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        let err = handshake.run(Box::new(page)).await.unwrap_err();

        assert!(matches!(
            err,
            AccessError::Browser(BrowserError::ElementNotFound(ref s)) if s == EMAIL_SELECTOR
        ));
        assert_eq!(handshake.state(), &HandshakeState::Filling);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_alert_lookup_failure_is_not_hidden() {
        let creds = credentials();
        let page = ScriptedPage {
            urls: vec![LOGIN_URL.to_string()],
            alert_error: Some("Target closed".to_string()),
            ..Default::default()
        };
        let closes = page.closes.clone();

        let mut handshake = Handshake::new(LOGIN_URL, &creds, fast_config());
        let err = handshake.run(Box::new(page)).await.unwrap_err();

        assert!(matches!(err, AccessError::Browser(BrowserError::Cdp(ref m)) if m == "Target closed"));
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    struct ScriptedLauncher {
        available: bool,
        token: Option<String>,
        closes: Arc<AtomicUsize>,
        launched_headless: Mutex<Option<bool>>,
    }

    #[async_trait]
    impl PageLauncher for ScriptedLauncher {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn launch(&self, headless: bool) -> Result<Box<dyn LoginPage>, BrowserError> {
            *self.launched_headless.lock().unwrap() = Some(headless);
            Ok(Box::new(ScriptedPage {
                token: self.token.clone(),
                closes: self.closes.clone(),
                ..ScriptedPage::redirecting_to(DASHBOARD_URL)
            }))
        }
    }

    #[tokio::test]
    async fn test_browser_authenticator_uses_frontend_login_page() {
        let launcher = Arc::new(ScriptedLauncher {
            available: true,
            token: Some("tok".to_string()),
            closes: Arc::new(AtomicUsize::new(0)),
            launched_headless: Mutex::new(None),
        });
        let auth = BrowserAuthenticator::new(launcher.clone());
        let ctx = AccessContext::new().unwrap();

        let request = AccessRequest::new(
            stallmap_core::BaseUrl::parse("http://localhost:8080").unwrap(),
            credentials(),
        )
        .with_headless(false);

        assert!(auth.is_available(&ctx).await);
        let token = auth.authenticate(&ctx, &request).await.unwrap();

        assert_eq!(token.expose(), "tok");
        assert_eq!(*launcher.launched_headless.lock().unwrap(), Some(false));
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 1);
        assert_eq!(auth.id(), "signin.browser");
    }
}
