//! Host environment port.
//!
//! Everything the engine needs from its host besides translations: persistent
//! key/value storage (the chosen language), the user's preferred languages, and
//! attaching/detaching document-level overlays such as the date picker's
//! click-outside backdrop.

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};

/// Services provided by the host.
pub trait Environment: Send + Sync {
    /// Read a persisted value.
    fn storage_get(&self, key: &str) -> Option<String>;

    /// Persist a value.
    fn storage_set(&self, key: &str, value: &str);

    /// Preferred language tags, most preferred first.
    fn preferred_languages(&self) -> Vec<String> {
        Vec::new()
    }

    /// Attach a document-level backdrop owned by `owner`.
    fn attach_backdrop(&self, owner: &str);

    /// Remove the backdrop owned by `owner`. Unknown owners are ignored.
    fn detach_backdrop(&self, owner: &str);
}

/// In-memory environment for headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryEnvironment {
    storage: Mutex<HashMap<String, String>>,
    preferred: Vec<String>,
    backdrops: Mutex<BTreeSet<String>>,
}

impl MemoryEnvironment {
    /// Create an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the preferred languages reported to the store.
    pub fn with_preferred_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred = languages.into_iter().map(Into::into).collect();
        self
    }

    /// Pre-populate a stored value.
    pub fn with_stored(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.storage.lock().insert(key.into(), value.into());
        self
    }

    /// Owners with a currently attached backdrop.
    pub fn attached_backdrops(&self) -> Vec<String> {
        self.backdrops.lock().iter().cloned().collect()
    }
}

impl Environment for MemoryEnvironment {
    fn storage_get(&self, key: &str) -> Option<String> {
        self.storage.lock().get(key).cloned()
    }

    fn storage_set(&self, key: &str, value: &str) {
        self.storage.lock().insert(key.to_string(), value.to_string());
    }

    fn preferred_languages(&self) -> Vec<String> {
        self.preferred.clone()
    }

    fn attach_backdrop(&self, owner: &str) {
        self.backdrops.lock().insert(owner.to_string());
    }

    fn detach_backdrop(&self, owner: &str) {
        self.backdrops.lock().remove(owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_round_trip() {
        let env = MemoryEnvironment::new().with_stored("language", "it-IT");
        assert_eq!(env.storage_get("language"), Some("it-IT".to_string()));

        env.storage_set("language", "en-US");
        assert_eq!(env.storage_get("language"), Some("en-US".to_string()));
        assert_eq!(env.storage_get("theme"), None);
    }

    #[test]
    fn test_backdrops() {
        let env = MemoryEnvironment::new();
        env.attach_backdrop("date-1");
        env.attach_backdrop("date-2");
        env.detach_backdrop("date-1");
        env.detach_backdrop("unknown");
        assert_eq!(env.attached_backdrops(), vec!["date-2".to_string()]);
    }
}
