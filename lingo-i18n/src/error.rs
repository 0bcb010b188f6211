//! Error types for i18n operations

use thiserror::Error;

/// Errors that can occur during i18n operations.
///
/// Missing translations are deliberately absent: lookups fall back to the
/// key path and log a diagnostic instead of failing.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Culture code that cannot be parsed
    #[error("Invalid culture code: {0}")]
    InvalidCulture(String),

    /// Culture code that is well-formed but not in the loaded catalogue
    #[error("Unknown culture: {0}")]
    UnknownCulture(String),

    /// An operation needs an active culture but none has been loaded yet
    #[error("No active culture; call set_language or initialize first")]
    NoActiveCulture,

    /// Transport-level failure while fetching translations
    #[error("Failed to fetch {resource}: {message}")]
    Network { resource: String, message: String },

    /// Server answered with a non-success status
    #[error("Failed to fetch {resource}: HTTP {status}")]
    Status { resource: String, status: u16 },

    /// JSON parse error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl I18nError {
    /// Whether this error belongs to the network-failure class.
    ///
    /// The store keeps serving its previous tree when this is true.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Status { .. })
    }

    pub(crate) fn network(resource: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Network {
            resource: resource.into(),
            message: err.to_string(),
        }
    }
}
