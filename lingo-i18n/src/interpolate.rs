//! Parameter interpolation for `{{name}}` placeholders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("placeholder regex is valid"));

/// Named values substituted into message templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter.
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(name.into(), value.to_string());
        self
    }

    /// Look up a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

/// Replace every `{{name}}` with the matching parameter.
///
/// Placeholders without a matching parameter are kept verbatim.
///
/// ```
/// use lingo_i18n::{Params, interpolate};
///
/// let params = Params::new().with("name", "Ada");
/// assert_eq!(interpolate("Hi {{name}}, {{missing}}", &params), "Hi Ada, {{missing}}");
/// ```
pub fn interpolate(template: &str, params: &Params) -> String {
    if params.is_empty() || !template.contains("{{") {
        return template.to_string();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match params.get(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
