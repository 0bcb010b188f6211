//! Form integration contracts.
//!
//! [`ValueAccessor`] is what a date input exposes to the surrounding form
//! framework; [`FormControl`] is what the input needs from its parent control.

use lingo_i18n::{Params, TranslationStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Callback receiving the canonical value (`YYYY-MM-DD`) or `None`.
pub type ChangeCallback = Box<dyn Fn(Option<String>) + Send + Sync>;

/// Callback fired when the input is touched.
pub type TouchedCallback = Box<dyn Fn() + Send + Sync>;

/// One validation failure, described by a translation key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Stable error code, e.g. `dateFormat`
    pub code: String,
    /// Translation key of the user-facing message
    pub message_key: String,
    /// Parameters for the message
    pub params: Params,
}

impl FieldError {
    /// Create an error.
    pub fn new(code: impl Into<String>, message_key: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message_key: message_key.into(),
            params: Params::new(),
        }
    }

    /// Attach a message parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params = self.params.with(name, value);
        self
    }

    /// Translated message.
    pub fn message(&self, store: &TranslationStore) -> String {
        store.translate(&self.message_key, Some(&self.params))
    }
}

/// Validation errors keyed by code.
pub type FieldErrors = BTreeMap<String, FieldError>;

/// Contract of the surrounding form framework towards a value input.
pub trait ValueAccessor {
    /// Model-to-view write; must not echo back through the change callback.
    fn write_value(&mut self, value: Option<&str>);

    /// Register the view-to-model change callback.
    fn register_on_change(&mut self, callback: ChangeCallback);

    /// Register the touched callback.
    fn register_on_touched(&mut self, callback: TouchedCallback);

    /// Enable or disable the input.
    fn set_disabled(&mut self, disabled: bool);
}

/// Parent control contract: value plus validation errors.
pub trait FormControl: Send + Sync {
    /// Current model value.
    fn value(&self) -> Option<String>;

    /// Write a model value.
    fn set_value(&self, value: Option<String>);

    /// Current validation errors.
    fn errors(&self) -> FieldErrors;

    /// Replace the validation errors.
    fn set_errors(&self, errors: FieldErrors);
}

/// Minimal in-memory form control.
#[derive(Debug, Default)]
pub struct MemoryFormControl {
    value: RwLock<Option<String>>,
    errors: RwLock<FieldErrors>,
}

impl MemoryFormControl {
    /// Create an empty control.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any error is set.
    pub fn has_error(&self, code: &str) -> bool {
        self.errors.read().contains_key(code)
    }
}

impl FormControl for MemoryFormControl {
    fn value(&self) -> Option<String> {
        self.value.read().clone()
    }

    fn set_value(&self, value: Option<String>) {
        *self.value.write() = value;
    }

    fn errors(&self) -> FieldErrors {
        self.errors.read().clone()
    }

    fn set_errors(&self, errors: FieldErrors) {
        *self.errors.write() = errors;
    }
}
