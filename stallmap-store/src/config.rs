//! Configuration management.
//!
//! Every field has a default, so a partial file (or none at all) is valid.
//! Command-line flags override whatever is loaded here.

use crate::error::StoreError;
use crate::persistence::default_config_dir;
use serde::{Deserialize, Serialize};
use stallmap_core::{DEFAULT_BACKEND_URL, DEFAULT_FRONTEND_URL};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default export file, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "stall_map_data.json";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the REST backend.
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    /// Base URL of the web front end (browser login).
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Where stall data is written.
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// HTTP request timeout for the API login variant.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Browser login settings.
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// Browser login settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run Chromium without a window.
    #[serde(default = "default_true")]
    pub headless: bool,
    /// How long to wait for the dashboard after submitting the form.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,
    /// Explicit Chromium executable; searched on `PATH` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_frontend_url() -> String {
    DEFAULT_FRONTEND_URL.to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_request_timeout() -> u64 {
    30
}

fn default_navigation_timeout() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            navigation_timeout_secs: default_navigation_timeout(),
            chrome_path: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            frontend_url: default_frontend_url(),
            output_path: default_output_path(),
            request_timeout_secs: default_request_timeout(),
            browser: BrowserConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_dir().join("config.json")
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an
    /// error.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    fn validate(&self) -> Result<(), StoreError> {
        if self.request_timeout_secs == 0 {
            return Err(StoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(StoreError::Config(
                "browser.navigation_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://localhost:8080");
        assert_eq!(config.frontend_url, "http://localhost:5173");
        assert_eq!(config.output_path, PathBuf::from("stall_map_data.json"));
        assert_eq!(config.request_timeout_secs, 30);
        assert!(config.browser.headless);
        assert_eq!(config.browser.navigation_timeout_secs, 15);
        assert!(config.browser.chrome_path.is_none());
    }

    #[test]
    fn test_default_path_is_config_json() {
        assert!(Config::default_path().ends_with("stallmap/config.json"));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"backend_url": "https://stalls.example.com", "browser": {"headless": false}}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "https://stalls.example.com");
        assert_eq!(config.frontend_url, "http://localhost:5173");
        assert!(!config.browser.headless);
        assert_eq!(config.browser.navigation_timeout_secs, 15);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.request_timeout_secs = 10;
        config.browser.chrome_path = Some(PathBuf::from("/usr/bin/chromium"));
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"request_timeout_secs": 0}"#).unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "backend_url = 'x'").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(StoreError::Serialization(_))
        ));
    }
}
