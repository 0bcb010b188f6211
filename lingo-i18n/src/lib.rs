//! Translation Store for Lingo
//!
//! Client-side translations backed by a REST API:
//!
//! - **Culture catalogue**: fetch available cultures and pick the initial one
//!   from persisted choice, user preference or server default
//! - **Translation trees**: one nested tree per culture, replaced wholesale on
//!   culture switch
//! - **Lazy categories**: merge individual top-level categories on demand
//! - **Key paths**: resolve `auth.login` style paths with `{{name}}` interpolation
//! - **Reactive culture**: observe the active culture through a versioned [`Signal`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lingo_i18n::{HttpTranslationFetcher, I18nConfig, MemoryEnvironment, TranslationStore};
//! use std::sync::Arc;
//!
//! let config = I18nConfig::from_env()?;
//! let fetcher = HttpTranslationFetcher::new(config.clone())?;
//! let store = TranslationStore::new(Arc::new(fetcher), Arc::new(MemoryEnvironment::new()), config);
//!
//! store.initialize().await?;
//! store.load_category("auth").await?;
//!
//! let msg = store.t("auth.login");
//! let msg = store.t_args("common.greet", &[("name", "Ada")]);
//!
//! // Unknown keys come back unchanged
//! assert_eq!(store.t("no.such.key"), "no.such.key");
//! ```

mod config;
mod culture;
mod environment;
mod error;
mod fetch;
mod interpolate;
mod reactive;
mod store;
mod tree;

pub use config::{I18nConfig, I18nConfigBuilder};
pub use culture::{Closeness, Culture, CultureCode, negotiate_culture};
pub use environment::{Environment, MemoryEnvironment};
pub use error::I18nError;
pub use fetch::{CultureTranslations, HttpTranslationFetcher, MemoryTranslationFetcher, TranslationFetcher};
pub use interpolate::{Params, interpolate};
pub use reactive::{Memo, Signal, Subscription};
pub use store::TranslationStore;
pub use tree::TranslationValue;

/// Result type for i18n operations
pub type Result<T> = std::result::Result<T, I18nError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Culture, CultureCode, Environment, I18nConfig, I18nError, Params, Result, Signal,
        TranslationFetcher, TranslationStore, TranslationValue,
    };
}
