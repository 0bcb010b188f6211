//! Translation Trees
//!
//! One culture's translations as a tagged tree: leaves hold message templates,
//! nodes map key segments to subtrees. Key paths (`auth.login`) address leaves.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// A node of a translation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationValue {
    /// A message template
    Leaf(String),
    /// Named children
    Node(HashMap<String, TranslationValue>),
}

impl Default for TranslationValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl TranslationValue {
    /// An empty node.
    pub fn empty() -> Self {
        Self::Node(HashMap::new())
    }

    /// Build a tree from an arbitrary JSON value.
    ///
    /// Strings become leaves, numbers and booleans become leaves holding their
    /// textual form, objects become nodes. Nulls and arrays carry no message
    /// and are dropped from their parent node.
    pub fn from_json(value: Value) -> Self {
        Self::convert(value).unwrap_or_default()
    }

    fn convert(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Leaf(s)),
            Value::Number(n) => Some(Self::Leaf(n.to_string())),
            Value::Bool(b) => Some(Self::Leaf(b.to_string())),
            Value::Object(map) => Some(Self::Node(
                map.into_iter()
                    .filter_map(|(key, child)| Self::convert(child).map(|c| (key, c)))
                    .collect(),
            )),
            Value::Null | Value::Array(_) => None,
        }
    }

    /// Parse a tree from JSON text.
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        Ok(Self::from_json(serde_json::from_str(json)?))
    }

    /// Convert back to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Leaf(s) => Value::String(s.clone()),
            Self::Node(children) => Value::Object(
                children
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Resolve a dotted key path.
    ///
    /// Returns `None` as soon as a segment is missing or a leaf is reached
    /// before the path is exhausted.
    pub fn resolve(&self, key_path: &str) -> Option<&TranslationValue> {
        key_path.split('.').try_fold(self, |current, segment| match current {
            Self::Node(children) => children.get(segment),
            Self::Leaf(_) => None,
        })
    }

    /// Resolve a dotted key path to a message template.
    pub fn resolve_leaf(&self, key_path: &str) -> Option<&str> {
        match self.resolve(key_path)? {
            Self::Leaf(s) => Some(s),
            Self::Node(_) => None,
        }
    }

    /// Install `subtree` under the top-level key `name`, replacing any stale
    /// value. A leaf root is promoted to an empty node first.
    pub fn merge_category(&mut self, name: &str, subtree: TranslationValue) {
        if let Self::Leaf(_) = self {
            *self = Self::empty();
        }
        if let Self::Node(children) = self {
            children.insert(name.to_string(), subtree);
        }
    }

    /// Whether a top-level key exists.
    pub fn has_category(&self, name: &str) -> bool {
        matches!(self, Self::Node(children) if children.contains_key(name))
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Node(children) => children.values().map(Self::leaf_count).sum(),
        }
    }

    /// Whether this is a node without children.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Node(children) if children.is_empty())
    }
}

impl<'de> Deserialize<'de> for TranslationValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

impl Serialize for TranslationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TranslationValue {
        TranslationValue::from_json(json!({
            "auth": {
                "login": "Log in",
                "welcome": "Welcome, {{name}}!"
            },
            "common": { "save": "Save", "count": 3, "enabled": true, "gone": null, "list": [1, 2] }
        }))
    }

    #[test]
    fn test_resolve_leaf() {
        let tree = sample();
        assert_eq!(tree.resolve_leaf("auth.login"), Some("Log in"));
        assert_eq!(tree.resolve_leaf("common.count"), Some("3"));
        assert_eq!(tree.resolve_leaf("common.enabled"), Some("true"));
    }

    #[test]
    fn test_resolve_misses() {
        let tree = sample();
        assert!(tree.resolve("auth.logout").is_none());
        assert!(tree.resolve("auth.login.extra").is_none());
        assert!(tree.resolve_leaf("auth").is_none());
        assert!(tree.resolve("common.gone").is_none());
        assert!(tree.resolve("common.list").is_none());
        assert!(tree.resolve("").is_none());
    }

    #[test]
    fn test_merge_category_replaces_stale_value() {
        let mut tree = sample();
        tree.merge_category("auth", TranslationValue::from_json(json!({ "login": "Sign in" })));

        assert_eq!(tree.resolve_leaf("auth.login"), Some("Sign in"));
        assert!(tree.resolve("auth.welcome").is_none());
        assert_eq!(tree.resolve_leaf("common.save"), Some("Save"));
    }

    #[test]
    fn test_merge_into_leaf_root() {
        let mut tree = TranslationValue::Leaf("oops".to_string());
        tree.merge_category("menu", TranslationValue::from_json(json!({ "home": "Home" })));
        assert_eq!(tree.resolve_leaf("menu.home"), Some("Home"));
        assert!(tree.has_category("menu"));
    }

    #[test]
    fn test_deserialize_and_count() {
        let tree: TranslationValue =
            serde_json::from_str(r#"{"a": {"b": "x", "c": {"d": "y"}}, "e": "z"}"#).unwrap();
        assert_eq!(tree.leaf_count(), 3);
        assert!(!tree.is_empty());
        assert!(TranslationValue::empty().is_empty());
    }
}
