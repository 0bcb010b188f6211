//! Translation fetch port.
//!
//! The store pulls translations through [`TranslationFetcher`]. The HTTP
//! implementation talks to:
//!
//! - `GET {base}/translations/cultures`
//! - `GET {base}/translations/{culture}`
//! - `GET {base}/translations/{culture}/category/{category}`

use crate::{Culture, I18nConfig, I18nError, Result, TranslationValue};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Response of `GET /translations/{culture}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultureTranslations {
    /// The culture the tree belongs to
    pub culture: Culture,
    /// Full translation tree
    pub translations: TranslationValue,
}

/// Source of culture catalogues and translation trees.
#[async_trait]
pub trait TranslationFetcher: Send + Sync {
    /// Fetch the culture catalogue.
    async fn fetch_cultures(&self) -> Result<Vec<Culture>>;

    /// Fetch a culture's full translation tree.
    async fn fetch_culture(&self, code: &str) -> Result<CultureTranslations>;

    /// Fetch a single category of a culture's translations.
    async fn fetch_category(&self, code: &str, category: &str) -> Result<TranslationValue>;
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetcher backed by the translations REST API.
#[derive(Debug, Clone)]
pub struct HttpTranslationFetcher {
    client: reqwest::Client,
    config: I18nConfig,
}

impl HttpTranslationFetcher {
    /// Create a fetcher for the configured API.
    pub fn new(config: I18nConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("lingo-i18n/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| I18nError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Create a fetcher sharing an existing client.
    pub fn with_client(client: reqwest::Client, config: I18nConfig) -> Self {
        Self { client, config }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(url = %url, "Fetching translations");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| I18nError::network(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(I18nError::Status {
                resource: url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| I18nError::network(&url, e))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TranslationFetcher for HttpTranslationFetcher {
    async fn fetch_cultures(&self) -> Result<Vec<Culture>> {
        self.get_json(self.config.cultures_url()).await
    }

    async fn fetch_culture(&self, code: &str) -> Result<CultureTranslations> {
        self.get_json(self.config.culture_url(code)).await
    }

    async fn fetch_category(&self, code: &str, category: &str) -> Result<TranslationValue> {
        self.get_json(self.config.category_url(code, category)).await
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Fetcher serving trees held in memory.
///
/// Category requests are answered from the top-level keys of the culture's
/// tree, mirroring what the HTTP API returns.
#[derive(Debug, Default)]
pub struct MemoryTranslationFetcher {
    cultures: RwLock<Vec<Culture>>,
    trees: RwLock<HashMap<String, TranslationValue>>,
}

impl MemoryTranslationFetcher {
    /// Create an empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a culture with its full tree, replacing any previous entry.
    pub fn with_culture(self, culture: Culture, tree: TranslationValue) -> Self {
        self.insert(culture, tree);
        self
    }

    /// Add or replace a culture with its full tree.
    pub fn insert(&self, culture: Culture, tree: TranslationValue) {
        let mut cultures = self.cultures.write();
        cultures.retain(|c| c.code != culture.code);
        self.trees.write().insert(culture.code.clone(), tree);
        cultures.push(culture);
    }

    fn not_found(resource: String) -> I18nError {
        I18nError::Status { resource, status: 404 }
    }
}

#[async_trait]
impl TranslationFetcher for MemoryTranslationFetcher {
    async fn fetch_cultures(&self) -> Result<Vec<Culture>> {
        Ok(self.cultures.read().clone())
    }

    async fn fetch_culture(&self, code: &str) -> Result<CultureTranslations> {
        let culture = self
            .cultures
            .read()
            .iter()
            .find(|c| c.code == code)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("translations/{code}")))?;
        let translations = self.trees.read().get(code).cloned().unwrap_or_default();
        Ok(CultureTranslations { culture, translations })
    }

    async fn fetch_category(&self, code: &str, category: &str) -> Result<TranslationValue> {
        self.trees
            .read()
            .get(code)
            .and_then(|tree| tree.resolve(category))
            .cloned()
            .ok_or_else(|| Self::not_found(format!("translations/{code}/category/{category}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> I18nConfig {
        I18nConfig::builder().api_base_url(server.uri()).build().unwrap()
    }

    #[tokio::test]
    async fn test_http_fetch_cultures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translations/cultures"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "code": "en-US", "name": "English", "isDefault": true },
                { "code": "it-IT", "name": "Italiano", "isDefault": false }
            ])))
            .mount(&server)
            .await;

        let fetcher = HttpTranslationFetcher::new(config_for(&server)).unwrap();
        let cultures = fetcher.fetch_cultures().await.unwrap();
        assert_eq!(cultures.len(), 2);
        assert!(cultures[0].is_default);
    }

    #[tokio::test]
    async fn test_http_fetch_culture_and_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translations/it-IT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "culture": { "code": "it-IT", "name": "Italiano", "isDefault": false },
                "translations": { "common": { "save": "Salva" } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/translations/it-IT/category/auth"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "Accedi" })))
            .mount(&server)
            .await;

        let fetcher = HttpTranslationFetcher::new(config_for(&server)).unwrap();

        let full = fetcher.fetch_culture("it-IT").await.unwrap();
        assert_eq!(full.culture.code, "it-IT");
        assert_eq!(full.translations.resolve_leaf("common.save"), Some("Salva"));

        let auth = fetcher.fetch_category("it-IT", "auth").await.unwrap();
        assert_eq!(auth.resolve_leaf("login"), Some("Accedi"));
    }

    #[tokio::test]
    async fn test_http_status_error_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/translations/xx-XX"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = HttpTranslationFetcher::new(config_for(&server)).unwrap();
        let err = fetcher.fetch_culture("xx-XX").await.unwrap_err();
        assert!(err.is_network());
        assert!(matches!(err, I18nError::Status { status: 500, .. }));
    }

    #[test]
    fn test_memory_fetcher_serves_categories() {
        let fetcher = MemoryTranslationFetcher::new().with_culture(
            Culture::new("en-US", "English", true),
            TranslationValue::from_json(json!({ "auth": { "login": "Log in" } })),
        );

        tokio_test::block_on(async {
            let auth = fetcher.fetch_category("en-US", "auth").await.unwrap();
            assert_eq!(auth.resolve_leaf("login"), Some("Log in"));
            assert!(fetcher.fetch_category("en-US", "menu").await.is_err());
            assert!(fetcher.fetch_culture("it-IT").await.is_err());
        });
    }
}
