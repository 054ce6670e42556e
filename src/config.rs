//! Client configuration
//!
//! A [`ClientConfig`] is validated once, when built or loaded, and is
//! read-only afterwards.
//!
//! # Example
//!
//! ```rust
//! use rusty_oxr::{ClientConfig, NumericMode};
//!
//! let config = ClientConfig::builder("  my-app-id ")
//!     .base("eur")
//!     .numeric_mode(NumericMode::Decimal)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.api_key(), "my-app-id");
//! assert_eq!(config.base(), "EUR");
//! ```

use crate::currency::{normalize_code, DEFAULT_BASE};
use crate::error::{ExchangeError, Result};
use crate::rate::NumericMode;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Public endpoint of the Open Exchange Rates API
pub const DEFAULT_BASE_URL: &str = "https://openexchangerates.org/api";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Immutable configuration of an [`ExchangeRateClient`](crate::ExchangeRateClient)
#[derive(Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    api_key: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default)]
    numeric_mode: NumericMode,
    #[serde(default = "default_base")]
    base: String,
    #[serde(default)]
    local_base: Option<String>,
    #[serde(default = "default_html_table_header")]
    html_table_header: bool,
    #[serde(default = "default_base_url")]
    base_url: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_base() -> String {
    DEFAULT_BASE.to_string()
}

fn default_html_table_header() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl ClientConfig {
    /// Start building a configuration for `api_key`
    pub fn builder(api_key: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: ClientConfig {
                api_key: api_key.into(),
                timeout_secs: default_timeout_secs(),
                numeric_mode: NumericMode::default(),
                base: default_base(),
                local_base: None,
                html_table_header: default_html_table_header(),
                base_url: default_base_url(),
            },
        }
    }

    /// Defaults for everything except the key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Parse and validate a TOML document.
    ///
    /// ```toml
    /// api_key = "my-app-id"
    /// timeout_secs = 30
    /// numeric_mode = "decimal"
    /// local_base = "EUR"
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(contents)?;
        config.validated()
    }

    /// Read, parse and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        log::debug!("Loaded client config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    fn validated(mut self) -> Result<Self> {
        self.api_key = self.api_key.trim().to_string();
        if self.api_key.is_empty() {
            return Err(ExchangeError::Configuration(
                "API key must not be empty".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ExchangeError::Configuration(
                "Timeout must be a positive number of seconds".to_string(),
            ));
        }

        self.base = normalize_code(&self.base)?;
        self.local_base = match self.local_base.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(code) => Some(normalize_code(code)?),
        };

        let base_url = self.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ExchangeError::Configuration(format!(
                "Base URL must be http(s), got: {:?}",
                self.base_url
            )));
        }
        self.base_url = base_url.to_string();

        Ok(self)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn numeric_mode(&self) -> NumericMode {
        self.numeric_mode
    }

    /// Base currency requested from the service
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Currency that fetched tables are re-based on, offline
    pub fn local_base(&self) -> Option<&str> {
        self.local_base.as_deref()
    }

    pub fn html_table_header(&self) -> bool {
        self.html_table_header
    }

    /// API root without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("numeric_mode", &self.numeric_mode)
            .field("base", &self.base)
            .field("local_base", &self.local_base)
            .field("html_table_header", &self.html_table_header)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for [`ClientConfig`]; validation happens in [`build`](Self::build)
#[derive(Clone)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Request timeout in whole seconds (must be positive)
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn numeric_mode(mut self, mode: NumericMode) -> Self {
        self.config.numeric_mode = mode;
        self
    }

    /// Base currency requested from the service (default USD)
    pub fn base(mut self, code: &str) -> Self {
        self.config.base = code.to_string();
        self
    }

    /// Re-base every fetched table on `code` locally
    pub fn local_base(mut self, code: &str) -> Self {
        self.config.local_base = Some(code.to_string());
        self
    }

    pub fn html_table_header(mut self, enabled: bool) -> Self {
        self.config.html_table_header = enabled;
        self
    }

    /// Override the API root, e.g. to target a proxy or a mock server
    pub fn base_url(mut self, url: &str) -> Self {
        self.config.base_url = url.to_string();
        self
    }

    pub fn build(self) -> Result<ClientConfig> {
        self.config.validated()
    }
}
