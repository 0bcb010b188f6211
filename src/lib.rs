// Lingo - client-side translations and locale-aware date input
//
// Translation trees are fetched per culture and extended category by category;
// the date input derives its expected format from the active culture instead
// of a per-locale table.

// Re-export the translation store
pub use lingo_i18n::*;

// Re-export optional crates
#[cfg(feature = "datefield")]
pub use lingo_datefield;

#[cfg(feature = "datefield")]
pub use lingo_datefield::{
    CalendarCell, CalendarGrid, CalendarGridBuilder, DateFieldError, DateInput, DateTextParser,
    FieldError, FormControl, FormatPattern, FormatValidator, LocaleFormatInferencer,
    MemoryFormControl, ReactiveBinding, ShapeStatus, ValueAccessor, ViewMonth,
};

// Prelude for common imports
pub mod prelude {
    pub use lingo_i18n::{
        Culture, CultureCode, Environment, I18nConfig, I18nError, MemoryEnvironment,
        MemoryTranslationFetcher, Params, Signal, TranslationFetcher, TranslationStore,
        TranslationValue,
    };

    #[cfg(feature = "datefield")]
    pub use lingo_datefield::{
        CalendarGridBuilder, DateFieldError, DateInput, DateTextParser, FieldError, FormControl,
        FormatPattern, FormatValidator, LocaleFormatInferencer, ReactiveBinding, ValueAccessor,
        ViewMonth,
    };
}
