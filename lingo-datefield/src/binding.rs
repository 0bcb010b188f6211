//! Culture-derived values for a date input.
//!
//! [`ReactiveBinding`] watches two cells, the active culture and the selected
//! date. Everything that depends only on the culture (pattern, month and
//! weekday names) is computed together into one [`LocaleView`] keyed on the
//! culture version, so a reader never sees names from one culture next to a
//! pattern from another. The display text is keyed on both versions.

use crate::locale;
use crate::parse::{parse_canonical, to_canonical};
use crate::{DateFieldError, FormatPattern, LocaleFormatInferencer};
use chrono::NaiveDate;
use lingo_i18n::{Culture, Memo, Signal, TranslationStore};
use std::sync::Arc;
use tracing::{debug, warn};

const FALLBACK_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const FALLBACK_WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Everything derived from one culture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleView {
    /// Culture the view was computed for
    pub culture: String,
    /// January first
    pub month_names: Vec<String>,
    /// Sunday first
    pub weekday_names: Vec<String>,
    pub format_pattern: FormatPattern,
}

/// Derived locale values for one date input.
pub struct ReactiveBinding {
    culture: Signal<Option<Culture>>,
    value: Signal<Option<NaiveDate>>,
    inferencer: Arc<LocaleFormatInferencer>,
    fallback_culture: String,
    view: Memo<LocaleView>,
    display: Memo<String>,
}

impl std::fmt::Debug for ReactiveBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveBinding")
            .field("culture", &self.culture_code())
            .field("value", &self.value.get())
            .finish()
    }
}

impl ReactiveBinding {
    /// Bind to a culture signal. `fallback_culture` is used while no culture
    /// is active.
    pub fn new(
        culture: Signal<Option<Culture>>,
        inferencer: Arc<LocaleFormatInferencer>,
        fallback_culture: impl Into<String>,
    ) -> Self {
        Self {
            culture,
            value: Signal::new(None),
            inferencer,
            fallback_culture: fallback_culture.into(),
            view: Memo::new(),
            display: Memo::new(),
        }
    }

    /// Bind to a store's active culture.
    pub fn from_store(store: &TranslationStore, inferencer: Arc<LocaleFormatInferencer>) -> Self {
        Self::new(
            store.culture_signal(),
            inferencer,
            store.config().fallback_culture.clone(),
        )
    }

    /// The culture signal this binding follows.
    pub fn culture_signal(&self) -> &Signal<Option<Culture>> {
        &self.culture
    }

    /// Code of the culture currently driving the derived values.
    pub fn culture_code(&self) -> String {
        self.culture
            .get()
            .map(|c| c.code)
            .unwrap_or_else(|| self.fallback_culture.clone())
    }

    /// Selected date.
    pub fn value(&self) -> Option<NaiveDate> {
        self.value.get()
    }

    /// Selected date as `YYYY-MM-DD`.
    pub fn canonical_value(&self) -> Option<String> {
        self.value.get().map(to_canonical)
    }

    /// Replace the selected date.
    pub fn set_value(&self, value: Option<NaiveDate>) {
        self.value.set(value);
    }

    /// Replace the selected date from a canonical string; invalid text clears it.
    pub fn set_canonical(&self, value: Option<&str>) {
        self.value.set(value.and_then(parse_canonical));
    }

    /// The value signal.
    pub fn value_signal(&self) -> &Signal<Option<NaiveDate>> {
        &self.value
    }

    /// All culture-derived values, computed together.
    pub fn locale_view(&self) -> Arc<LocaleView> {
        self.view_with_version().0
    }

    fn view_with_version(&self) -> (Arc<LocaleView>, u64) {
        let (culture, version) = self.culture.snapshot();
        let code = culture.map(|c| c.code).unwrap_or_else(|| self.fallback_culture.clone());
        let view = self.view.get_or_compute(&[version], || self.compute_view(&code));
        (view, version)
    }

    fn compute_view(&self, culture: &str) -> LocaleView {
        debug!(culture, "Computing locale view");
        let format_pattern = self.inferencer.infer_pattern(culture).unwrap_or_else(|e| {
            warn!(culture, error = %e, "No date pattern for culture; using ISO");
            FormatPattern::iso()
        });

        let names = locale::icu_locale(culture).and_then(|loc| {
            if !locale::has_locale_data(&loc)? {
                return Err(DateFieldError::UnknownCulture(culture.to_string()));
            }
            Ok((locale::month_names(&loc)?, locale::weekday_names(&loc)?))
        });
        let (month_names, weekday_names) = names.unwrap_or_else(|e| {
            warn!(culture, error = %e, "No localized calendar names; using English");
            (
                FALLBACK_MONTHS.iter().map(|s| s.to_string()).collect(),
                FALLBACK_WEEKDAYS.iter().map(|s| s.to_string()).collect(),
            )
        });

        LocaleView {
            culture: culture.to_string(),
            month_names,
            weekday_names,
            format_pattern,
        }
    }

    /// Localized month names, January first.
    pub fn month_names(&self) -> Vec<String> {
        self.locale_view().month_names.clone()
    }

    /// Localized abbreviated weekday names, Sunday first.
    pub fn weekday_names(&self) -> Vec<String> {
        self.locale_view().weekday_names.clone()
    }

    /// Pattern of the active culture.
    pub fn format_pattern(&self) -> FormatPattern {
        self.locale_view().format_pattern.clone()
    }

    /// Selected date rendered in the active culture's pattern, empty when unset.
    pub fn display_text(&self) -> String {
        let (view, culture_version) = self.view_with_version();
        let (value, value_version) = self.value.snapshot();
        let text = self.display.get_or_compute(&[culture_version, value_version], || {
            value
                .map(|date| view.format_pattern.format(date))
                .unwrap_or_default()
        });
        text.as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding() -> (Signal<Option<Culture>>, ReactiveBinding) {
        let culture = Signal::new(Some(Culture::new("en-US", "English", true)));
        let binding = ReactiveBinding::new(culture.clone(), Arc::new(LocaleFormatInferencer::new()), "en-US");
        (culture, binding)
    }

    #[test]
    fn test_culture_switch_recomputes_view_but_not_value() {
        let (culture, binding) = binding();
        binding.set_canonical(Some("2024-03-25"));

        assert_eq!(binding.format_pattern().to_string(), "mm/dd/yyyy");
        let en_weekdays = binding.weekday_names();
        assert_eq!(binding.display_text(), "03/25/2024");

        culture.set(Some(Culture::new("it-IT", "Italiano", false)));

        assert_eq!(binding.format_pattern().to_string(), "dd/mm/yyyy");
        assert_ne!(binding.weekday_names(), en_weekdays);
        assert_eq!(binding.canonical_value().as_deref(), Some("2024-03-25"));
        assert_eq!(binding.display_text(), "25/03/2024");
    }

    #[test]
    fn test_value_write_keeps_locale_view() {
        let (_culture, binding) = binding();
        let before = binding.locale_view();

        binding.set_canonical(Some("2024-01-02"));
        assert_eq!(binding.display_text(), "01/02/2024");

        let after = binding.locale_view();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_view_is_consistent_snapshot() {
        let (culture, binding) = binding();
        culture.set(Some(Culture::new("it-IT", "Italiano", false)));
        let view = binding.locale_view();
        assert_eq!(view.culture, "it-IT");
        assert_eq!(view.format_pattern.to_string(), "dd/mm/yyyy");
        assert_eq!(view.month_names.len(), 12);
        assert_eq!(view.weekday_names.len(), 7);
    }

    #[test]
    fn test_fallback_culture_when_none_active() {
        let culture = Signal::new(None);
        let binding = ReactiveBinding::new(culture, Arc::new(LocaleFormatInferencer::new()), "it-IT");
        assert_eq!(binding.culture_code(), "it-IT");
        assert_eq!(binding.format_pattern().to_string(), "dd/mm/yyyy");
    }

    #[test]
    fn test_unusable_culture_falls_back_to_iso() {
        let culture = Signal::new(Some(Culture::new("??", "Broken", false)));
        let binding = ReactiveBinding::new(culture, Arc::new(LocaleFormatInferencer::new()), "en-US");
        binding.set_canonical(Some("2024-03-25"));
        assert_eq!(binding.format_pattern(), FormatPattern::iso());
        assert_eq!(binding.month_names()[0], "January");
        assert_eq!(binding.display_text(), "2024-03-25");
    }

    #[test]
    fn test_culture_without_locale_data_falls_back_to_iso_and_english() {
        let culture = Signal::new(Some(Culture::new("xx-XX", "Nowhere", false)));
        let binding = ReactiveBinding::new(culture, Arc::new(LocaleFormatInferencer::new()), "en-US");
        assert_eq!(binding.format_pattern(), FormatPattern::iso());
        assert_eq!(binding.month_names()[11], "December");
        assert_eq!(binding.weekday_names()[0], "Sun");
    }

    #[test]
    fn test_invalid_canonical_clears_value() {
        let (_culture, binding) = binding();
        binding.set_canonical(Some("2024-02-30"));
        assert_eq!(binding.value(), None);
        assert_eq!(binding.display_text(), "");
    }
}
