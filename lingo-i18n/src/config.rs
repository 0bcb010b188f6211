//! Store configuration.

use crate::{I18nError, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Configuration for the translation store and its HTTP fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Base URL of the translations API (without the `/translations` suffix).
    pub api_base_url: String,
    /// Culture to use when neither storage nor preferences pick one.
    pub default_culture: Option<String>,
    /// Storage key under which the chosen language is persisted.
    pub storage_key: String,
    /// Per-request timeout.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Culture used for date formatting before any culture is active.
    pub fallback_culture: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            default_culture: None,
            storage_key: "language".to_string(),
            request_timeout: Duration::from_secs(10),
            fallback_culture: "en-US".to_string(),
        }
    }
}

impl I18nConfig {
    /// Create a configuration builder.
    pub fn builder() -> I18nConfigBuilder {
        I18nConfigBuilder::default()
    }

    /// Load from `LINGO_*` environment variables, reading `.env` first if present.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();

        let mut config = Self::default();

        if let Ok(url) = env::var("LINGO_API_URL") {
            config.api_base_url = url;
        }
        if let Ok(culture) = env::var("LINGO_DEFAULT_CULTURE") {
            config.default_culture = Some(culture);
        }
        if let Ok(key) = env::var("LINGO_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Ok(secs) = env::var("LINGO_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| I18nError::Config(format!("LINGO_REQUEST_TIMEOUT_SECS is not a number: {secs}")))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(culture) = env::var("LINGO_FALLBACK_CULTURE") {
            config.fallback_culture = culture;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML document.
    ///
    /// ```
    /// use lingo_i18n::I18nConfig;
    ///
    /// let config = I18nConfig::from_toml_str(r#"
    ///     api_base_url = "https://example.com/api"
    ///     request_timeout = 5
    /// "#).unwrap();
    /// assert_eq!(config.storage_key, "language");
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| I18nError::Config(format!("TOML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(I18nError::Config("api_base_url must not be empty".to_string()));
        }
        if self.storage_key.trim().is_empty() {
            return Err(I18nError::Config("storage_key must not be empty".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(I18nError::Config("request_timeout must be positive".to_string()));
        }
        crate::CultureCode::parse(&self.fallback_culture)
            .map_err(|_| I18nError::Config(format!("invalid fallback_culture: {}", self.fallback_culture)))?;
        if let Some(ref culture) = self.default_culture {
            crate::CultureCode::parse(culture)
                .map_err(|_| I18nError::Config(format!("invalid default_culture: {culture}")))?;
        }
        Ok(())
    }

    /// URL of the culture catalogue.
    pub fn cultures_url(&self) -> String {
        format!("{}/translations/cultures", self.base())
    }

    /// URL of a culture's full translation tree.
    pub fn culture_url(&self, code: &str) -> String {
        format!("{}/translations/{}", self.base(), code)
    }

    /// URL of one category of a culture's translations.
    pub fn category_url(&self, code: &str, category: &str) -> String {
        format!("{}/translations/{}/category/{}", self.base(), code, category)
    }

    fn base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Builder for [`I18nConfig`].
#[derive(Debug, Default)]
pub struct I18nConfigBuilder {
    config: I18nConfig,
}

impl I18nConfigBuilder {
    /// Set the API base URL.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    /// Set the default culture.
    pub fn default_culture(mut self, code: impl Into<String>) -> Self {
        self.config.default_culture = Some(code.into());
        self
    }

    /// Set the storage key for the persisted language.
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.config.storage_key = key.into();
        self
    }

    /// Set the request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the fallback culture for date formatting.
    pub fn fallback_culture(mut self, code: impl Into<String>) -> Self {
        self.config.fallback_culture = code.into();
        self
    }

    /// Validate and build.
    pub fn build(self) -> Result<I18nConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
