//! Configuration for the upload client and report renderer.
//!
//! All behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. One struct holds the endpoints, the timing of the
//! simulated progress, the request deadline and the report budgets, so a run
//! can be reproduced from its logged config.

use crate::error::ContractReaderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Environment variable overriding [`ClientConfig::api_base_url`].
pub const ENV_API_URL: &str = "CONTRACT_READER_API_URL";
/// Environment variable overriding [`ClientConfig::site_base_url`].
pub const ENV_SITE_URL: &str = "CONTRACT_READER_SITE_URL";

/// Configuration for a [`crate::upload::UploadOrchestrator`] and the
/// [`crate::backend::HttpBackend`].
///
/// # Example
/// ```rust
/// use contract_reader::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .api_base_url("https://api.example.com")
///     .request_timeout(Duration::from_secs(45))
///     .build()
///     .unwrap();
/// assert_eq!(config.analyze_url(), "https://api.example.com/api/v1/contract/analyze");
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the analysis backend. Default: `http://localhost:8002`.
    pub api_base_url: String,

    /// Base URL of the web site hosting the sample and simulation routes.
    /// Default: `http://localhost:3000`.
    pub site_base_url: String,

    /// Analysis route on the backend. Default: `/api/v1/contract/analyze`.
    pub analyze_path: String,

    /// Simulation route on the site. Default: `/api/simulate-board-ready`.
    pub simulate_path: String,

    /// Sample contract route on the site. Default: `/api/sample-contract`.
    pub sample_path: String,

    /// Dev-only token: a filename containing it (case-insensitive) is posted
    /// to the simulation route instead of the backend. Default: `None`.
    pub simulate_trigger: Option<String>,

    /// Client-enforced deadline for the analysis request. Default: 30 s.
    pub request_timeout: Duration,

    /// Percentage added per simulated upload tick. Default: 10.
    pub upload_step: u8,

    /// Delay between simulated upload ticks. Default: 50 ms.
    pub upload_step_delay: Duration,

    /// Interval between analysis status messages. Default: 2 s.
    pub status_interval: Duration,

    /// Characters of executive summary kept in the document. Default: 600.
    pub summary_char_budget: usize,

    /// Lines of executive summary kept in the document. Default: 8.
    pub summary_max_lines: usize,

    /// Display language. Default: [`Language::Fr`].
    pub language: Language,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8002".to_string(),
            site_base_url: "http://localhost:3000".to_string(),
            analyze_path: "/api/v1/contract/analyze".to_string(),
            simulate_path: "/api/simulate-board-ready".to_string(),
            sample_path: "/api/sample-contract".to_string(),
            simulate_trigger: None,
            request_timeout: Duration::from_secs(30),
            upload_step: 10,
            upload_step_delay: Duration::from_millis(50),
            status_interval: Duration::from_secs(2),
            summary_char_budget: 600,
            summary_max_lines: 8,
            language: Language::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("site_base_url", &self.site_base_url)
            .field("simulate_trigger", &self.simulate_trigger)
            .field("request_timeout", &self.request_timeout)
            .field("status_interval", &self.status_interval)
            .field("language", &self.language)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults, with the base URLs taken from the environment when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var(ENV_API_URL) {
            if !url.is_empty() {
                config.api_base_url = url;
            }
        }
        if let Ok(url) = std::env::var(ENV_SITE_URL) {
            if !url.is_empty() {
                config.site_base_url = url;
            }
        }
        config
    }

    /// Full URL of the analysis route.
    pub fn analyze_url(&self) -> String {
        join_url(&self.api_base_url, &self.analyze_path)
    }

    /// Full URL of the simulation route.
    pub fn simulate_url(&self) -> String {
        join_url(&self.site_base_url, &self.simulate_path)
    }

    /// Full URL of the sample contract route.
    pub fn sample_url(&self) -> String {
        join_url(&self.site_base_url, &self.sample_path)
    }

    /// Full URL of a backend-relative report link such as
    /// `/api/v1/contract/download?id=…`. Absolute links pass through.
    pub fn report_url(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            join_url(&self.api_base_url, link)
        }
    }

    /// Whether `filename` should be routed to the simulation route.
    pub fn is_simulated(&self, filename: &str) -> bool {
        match &self.simulate_trigger {
            Some(token) if !token.is_empty() => filename
                .to_lowercase()
                .contains(&token.to_lowercase()),
            _ => false,
        }
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn site_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.site_base_url = url.into();
        self
    }

    pub fn analyze_path(mut self, path: impl Into<String>) -> Self {
        self.config.analyze_path = path.into();
        self
    }

    pub fn simulate_path(mut self, path: impl Into<String>) -> Self {
        self.config.simulate_path = path.into();
        self
    }

    pub fn sample_path(mut self, path: impl Into<String>) -> Self {
        self.config.sample_path = path.into();
        self
    }

    pub fn simulate_trigger(mut self, token: impl Into<String>) -> Self {
        self.config.simulate_trigger = Some(token.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn upload_step(mut self, step: u8) -> Self {
        self.config.upload_step = step;
        self
    }

    pub fn upload_step_delay(mut self, delay: Duration) -> Self {
        self.config.upload_step_delay = delay;
        self
    }

    pub fn status_interval(mut self, interval: Duration) -> Self {
        self.config.status_interval = interval;
        self
    }

    pub fn summary_char_budget(mut self, chars: usize) -> Self {
        self.config.summary_char_budget = chars;
        self
    }

    pub fn summary_max_lines(mut self, lines: usize) -> Self {
        self.config.summary_max_lines = lines;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.config.language = language;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ContractReaderError> {
        let c = &self.config;
        for (name, url) in [("api_base_url", &c.api_base_url), ("site_base_url", &c.site_base_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ContractReaderError::InvalidConfig(format!(
                    "{name} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        if c.request_timeout.is_zero() {
            return Err(ContractReaderError::InvalidConfig(
                "request_timeout must be > 0".into(),
            ));
        }
        if c.upload_step == 0 || c.upload_step > 100 {
            return Err(ContractReaderError::InvalidConfig(format!(
                "upload_step must be 1–100, got {}",
                c.upload_step
            )));
        }
        if c.status_interval.is_zero() {
            return Err(ContractReaderError::InvalidConfig(
                "status_interval must be > 0".into(),
            ));
        }
        if c.summary_char_budget == 0 || c.summary_max_lines == 0 {
            return Err(ContractReaderError::InvalidConfig(
                "summary budgets must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Display language for status messages, errors and report labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    /// French (default; the backend and its users are French-speaking).
    #[default]
    Fr,
    /// English.
    En,
}
