//! Translation Store
//!
//! Holds the active culture's translation tree, loads categories on demand and
//! resolves key paths.
//!
//! # Consistency
//!
//! - A culture switch fetches the complete new tree before publishing it. Until
//!   then readers keep seeing the previous culture's tree.
//! - The tree is installed before the active-culture signal fires, so anything
//!   recomputed from the signal observes the new tree.
//! - A category in [`TranslationStore::loaded_categories`] always has its
//!   subtree in the current tree. The set is cleared when a switch starts and
//!   again when its tree is installed.
//! - Concurrent loads of the *same* category are not de-duplicated; the last
//!   one to finish wins. Loads that finish after a switch started are dropped.

use crate::{
    Culture, CultureCode, Environment, I18nConfig, I18nError, Params, Result, Signal,
    TranslationFetcher, TranslationValue, interpolate, negotiate_culture,
};
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct StoreState {
    cultures: Vec<Culture>,
    tree: TranslationValue,
    loaded: BTreeSet<String>,
    /// Advances on every culture switch
    generation: u64,
    pending_switches: usize,
    last_error: Option<String>,
}

/// Thread-safe translation store.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct TranslationStore {
    fetcher: Arc<dyn TranslationFetcher>,
    environment: Arc<dyn Environment>,
    config: Arc<I18nConfig>,
    state: Arc<RwLock<StoreState>>,
    active: Signal<Option<Culture>>,
}

impl std::fmt::Debug for TranslationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationStore")
            .field("active", &self.active.get().map(|c| c.code))
            .field("loaded", &self.loaded_categories())
            .finish()
    }
}

impl TranslationStore {
    /// Create an empty store. Nothing is fetched until [`initialize`] or
    /// [`set_language`] is called.
    ///
    /// [`initialize`]: TranslationStore::initialize
    /// [`set_language`]: TranslationStore::set_language
    pub fn new(
        fetcher: Arc<dyn TranslationFetcher>,
        environment: Arc<dyn Environment>,
        config: I18nConfig,
    ) -> Self {
        Self {
            fetcher,
            environment,
            config: Arc::new(config),
            state: Arc::new(RwLock::new(StoreState::default())),
            active: Signal::new(None),
        }
    }

    /// Store configuration.
    pub fn config(&self) -> &I18nConfig {
        &self.config
    }

    /// Host environment the store persists through.
    pub fn environment(&self) -> Arc<dyn Environment> {
        Arc::clone(&self.environment)
    }

    /// Fetch the culture catalogue and activate the initial culture.
    ///
    /// Selection order: persisted choice, negotiated user preference,
    /// configured default, catalogue default, first catalogue entry.
    pub async fn initialize(&self) -> Result<Culture> {
        let cultures = match self.fetcher.fetch_cultures().await {
            Ok(cultures) => cultures,
            Err(e) => return Err(self.record_failure("cultures", e)),
        };
        self.state.write().cultures = cultures.clone();

        let initial = self
            .pick_initial(&cultures)
            .ok_or_else(|| I18nError::UnknownCulture("<empty catalogue>".to_string()))?;

        self.set_language(&initial.code).await?;
        Ok(initial)
    }

    fn pick_initial(&self, cultures: &[Culture]) -> Option<Culture> {
        let stored = self
            .environment
            .storage_get(&self.config.storage_key)
            .and_then(|code| cultures.iter().find(|c| c.code == code));
        if let Some(culture) = stored {
            debug!(culture = %culture.code, "Using persisted culture");
            return Some(culture.clone());
        }

        let preferred: Vec<CultureCode> = self
            .environment
            .preferred_languages()
            .iter()
            .filter_map(|tag| CultureCode::parse(tag).ok())
            .collect();
        if let Some(culture) = negotiate_culture(&preferred, cultures) {
            debug!(culture = %culture.code, "Using negotiated culture");
            return Some(culture.clone());
        }

        self.config
            .default_culture
            .as_ref()
            .and_then(|code| cultures.iter().find(|c| &c.code == code))
            .or_else(|| cultures.iter().find(|c| c.is_default))
            .or_else(|| cultures.first())
            .cloned()
    }

    /// Switch to another culture.
    ///
    /// Clears the loaded-category set, fetches the culture's full tree and
    /// only then replaces the current tree wholesale and publishes the culture.
    /// On failure the previous tree stays in place and the error is recorded.
    pub async fn set_language(&self, code: &str) -> Result<()> {
        CultureCode::parse(code)?;

        {
            let mut state = self.state.write();
            if !state.cultures.is_empty() && !state.cultures.iter().any(|c| c.code == code) {
                return Err(I18nError::UnknownCulture(code.to_string()));
            }
            state.loaded.clear();
            state.generation += 1;
            state.pending_switches += 1;
        }

        let fetched = self.fetcher.fetch_culture(code).await;

        let culture = {
            let mut state = self.state.write();
            state.pending_switches -= 1;
            match fetched {
                Ok(payload) => {
                    // Categories merged while the fetch was in flight went
                    // into the tree being replaced.
                    state.loaded.clear();
                    state.generation += 1;
                    state.tree = payload.translations;
                    state.last_error = None;
                    payload.culture
                }
                Err(e) => {
                    drop(state);
                    return Err(self.record_failure(&format!("translations/{code}"), e));
                }
            }
        };

        self.environment.storage_set(&self.config.storage_key, &culture.code);
        info!(culture = %culture.code, "Culture switched");
        self.active.set(Some(culture));
        Ok(())
    }

    /// Load one category into the current tree.
    ///
    /// A no-op when the category is already loaded.
    pub async fn load_category(&self, name: &str) -> Result<()> {
        let (code, generation) = {
            let state = self.state.read();
            if state.loaded.contains(name) {
                return Ok(());
            }
            let code = self
                .active
                .get()
                .map(|c| c.code)
                .ok_or(I18nError::NoActiveCulture)?;
            (code, state.generation)
        };

        let subtree = match self.fetcher.fetch_category(&code, name).await {
            Ok(subtree) => subtree,
            Err(e) => return Err(self.record_failure(&format!("translations/{code}/category/{name}"), e)),
        };

        let mut state = self.state.write();
        if state.generation != generation {
            debug!(category = name, culture = %code, "Discarding category fetched for a previous culture");
            return Ok(());
        }
        state.tree.merge_category(name, subtree);
        state.loaded.insert(name.to_string());
        debug!(category = name, culture = %code, "Category loaded");
        Ok(())
    }

    fn record_failure(&self, resource: &str, error: I18nError) -> I18nError {
        warn!(resource, error = %error, "Translation fetch failed; keeping previous translations");
        self.state.write().last_error = Some(error.to_string());
        error
    }

    /// Translate a key path, substituting `{{name}}` placeholders.
    ///
    /// Never fails: an unresolvable key path is returned unchanged and logged.
    pub fn translate(&self, key_path: &str, params: Option<&Params>) -> String {
        match self.lookup(key_path) {
            Some(template) => match params {
                Some(params) => interpolate(&template, params),
                None => template,
            },
            None => {
                let culture = self.active_code().unwrap_or_else(|| "<none>".to_string());
                warn!(key = key_path, culture = %culture, "Missing translation");
                key_path.to_string()
            }
        }
    }

    /// Translate without parameters.
    pub fn t(&self, key_path: &str) -> String {
        self.translate(key_path, None)
    }

    /// Translate with `(name, value)` parameters.
    pub fn t_args(&self, key_path: &str, args: &[(&str, &str)]) -> String {
        let params: Params = args.iter().copied().collect();
        self.translate(key_path, Some(&params))
    }

    /// Raw template for a key path, without diagnostics.
    pub fn lookup(&self, key_path: &str) -> Option<String> {
        self.state.read().tree.resolve_leaf(key_path).map(str::to_string)
    }

    /// Whether a key path resolves to a message.
    pub fn has_translation(&self, key_path: &str) -> bool {
        self.state.read().tree.resolve_leaf(key_path).is_some()
    }

    /// Snapshot of the current tree.
    pub fn tree(&self) -> TranslationValue {
        self.state.read().tree.clone()
    }

    /// Categories merged since the last culture switch.
    pub fn loaded_categories(&self) -> Vec<String> {
        self.state.read().loaded.iter().cloned().collect()
    }

    /// Whether a category has been merged since the last culture switch.
    pub fn is_category_loaded(&self, name: &str) -> bool {
        self.state.read().loaded.contains(name)
    }

    /// Culture catalogue fetched by [`initialize`](TranslationStore::initialize).
    pub fn cultures(&self) -> Vec<Culture> {
        self.state.read().cultures.clone()
    }

    /// Currently active culture.
    pub fn active_culture(&self) -> Option<Culture> {
        self.active.get()
    }

    /// Code of the currently active culture.
    pub fn active_code(&self) -> Option<String> {
        self.active.get().map(|c| c.code)
    }

    /// Reactive handle on the active culture.
    pub fn culture_signal(&self) -> Signal<Option<Culture>> {
        self.active.clone()
    }

    /// Whether a culture switch is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.read().pending_switches > 0
    }

    /// Message of the most recent fetch failure, until cleared or a switch succeeds.
    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// Acknowledge the recorded fetch failure.
    pub fn clear_error(&self) {
        self.state.write().last_error = None;
    }
}
