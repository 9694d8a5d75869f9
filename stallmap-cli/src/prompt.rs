//! Interactive credential collection.
//!
//! Asks only for what the command line and config did not settle. URLs show
//! their default and a blank answer takes it; the password is read without
//! echo.

use stallmap_core::{AccessRequest, BaseUrl, CoreError, CredentialSource, Credentials};
use std::io::{self, BufRead, Write};

/// Reads a password after showing a prompt.
pub type PasswordReader = Box<dyn FnMut(&str) -> io::Result<String> + Send>;

// ============================================================================
// Prompt Plan
// ============================================================================

/// A URL that is either already known or asked for with a default.
#[derive(Debug, Clone)]
pub enum UrlAnswer {
    /// Given on the command line.
    Given(String),
    /// Prompted for; a blank answer takes the default.
    Ask {
        /// Shown in the prompt.
        default: String,
    },
}

/// Browser-only questions.
#[derive(Debug, Clone)]
pub struct BrowserPlan {
    /// Frontend URL.
    pub frontend: UrlAnswer,
    /// Forced by `--headless`/`--headed`; asked when `None`.
    pub headless: Option<bool>,
    /// Answer taken when the headless question is left blank.
    pub headless_default: bool,
}

/// What to ask and what is already known.
#[derive(Debug, Clone)]
pub struct PromptPlan {
    /// Backend URL.
    pub backend: UrlAnswer,
    /// Present for the browser variant.
    pub browser: Option<BrowserPlan>,
    /// Email, if given.
    pub email: Option<String>,
    /// Password, if given.
    pub password: Option<String>,
}

// ============================================================================
// Interactive Source
// ============================================================================

/// Prompts on `output`, reads answers from `input`.
pub struct InteractiveSource<R, W> {
    input: R,
    output: W,
    read_password: PasswordReader,
    plan: PromptPlan,
}

impl InteractiveSource<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on the terminal. Prompts go to stderr so stdout stays clean.
    pub fn terminal(plan: PromptPlan) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), plan)
            .with_password_reader(Box::new(|prompt: &str| rpassword::prompt_password(prompt)))
    }
}

impl<R: BufRead, W: Write> InteractiveSource<R, W> {
    /// Creates a source over arbitrary streams.
    ///
    /// Password prompts fail until a reader is set with
    /// [`Self::with_password_reader`].
    pub fn new(input: R, output: W, plan: PromptPlan) -> Self {
        Self {
            input,
            output,
            read_password: Box::new(|_: &str| {
                Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "no password reader configured",
                ))
            }),
            plan,
        }
    }

    /// Sets how the password is read.
    #[must_use]
    pub fn with_password_reader(mut self, reader: PasswordReader) -> Self {
        self.read_password = reader;
        self
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn resolve_url(&mut self, label: &str, answer: &UrlAnswer) -> Result<BaseUrl, CoreError> {
        match answer {
            UrlAnswer::Given(url) => BaseUrl::parse(url),
            UrlAnswer::Ask { default } => {
                let prompt = format!("{label:<14}(default: {default}): ");
                let reply = self.ask(&prompt)?;
                BaseUrl::parse_or(&reply, default)
            }
        }
    }

    fn banner(&mut self) -> io::Result<()> {
        writeln!(self.output, "╔══════════════════════════════════════════════╗")?;
        writeln!(self.output, "║      Employee Stall Map Access Tool          ║")?;
        writeln!(self.output, "╚══════════════════════════════════════════════╝")?;
        writeln!(self.output)
    }
}

impl<R: BufRead, W: Write> CredentialSource for InteractiveSource<R, W> {
    fn name(&self) -> &'static str {
        "interactive"
    }

    fn collect(&mut self) -> Result<AccessRequest, CoreError> {
        let plan = self.plan.clone();
        self.banner()?;

        let frontend = match &plan.browser {
            Some(browser) => Some(self.resolve_url("Frontend URL", &browser.frontend)?),
            None => None,
        };
        let backend = self.resolve_url("Backend URL", &plan.backend)?;

        writeln!(self.output)?;
        let email = match plan.email {
            Some(email) => email,
            None => self.ask("Employee Email:    ")?,
        };
        let password = match plan.password {
            Some(password) => password,
            None => (self.read_password)("Employee Password: ")?,
        };
        let credentials = Credentials::new(email, password)?;

        let mut request = AccessRequest::new(backend, credentials);
        if let (Some(browser), Some(frontend)) = (&plan.browser, frontend) {
            let headless = match browser.headless {
                Some(headless) => headless,
                None if browser.headless_default => {
                    writeln!(self.output)?;
                    !self
                        .ask("Hide browser window? (Y/n): ")?
                        .eq_ignore_ascii_case("n")
                }
                None => {
                    writeln!(self.output)?;
                    self.ask("Hide browser window? (y/N): ")?
                        .eq_ignore_ascii_case("y")
                }
            };
            request = request.with_frontend(frontend).with_headless(headless);
        }

        Ok(request)
    }
}

// ============================================================================
// Tests
// ============================================================================
