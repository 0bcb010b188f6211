//! Locale-aware date input for Lingo
//!
//! The expected text format of a date is not configured per locale; it is
//! derived from the locale's own formatter:
//!
//! - **Pattern inference**: format a reference date and read back the field
//!   order and separators (`mm/dd/yyyy`, `dd.mm.yyyy`, ...)
//! - **Parsing**: locale-independent formats first, then three numeric groups
//!   in the culture's field order
//! - **Shape validation**: tell "still typing" from "wrong format"
//! - **Calendar grids**: fixed 6x7 month views
//! - **Reactive binding**: culture-derived names and patterns recomputed on
//!   culture switch, never touching the selected date
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lingo_datefield::{DateInput, LocaleFormatInferencer, ValueAccessor};
//! use std::sync::Arc;
//!
//! let inferencer = Arc::new(LocaleFormatInferencer::new());
//! let mut input = DateInput::new(&store, inferencer);
//!
//! input.register_on_change(Box::new(|value| println!("{value:?}")));
//! input.input("03/25/2024"); // prints Some("2024-03-25") under en-US
//! ```

mod accessor;
mod binding;
mod calendar;
mod error;
mod infer;
mod locale;
mod parse;
mod pattern;
mod validate;
mod widget;

pub use accessor::{
    ChangeCallback, FieldError, FieldErrors, FormControl, MemoryFormControl, TouchedCallback,
    ValueAccessor,
};
pub use binding::{LocaleView, ReactiveBinding};
pub use calendar::{
    CalendarCell, CalendarGrid, CalendarGridBuilder, Clock, GRID_CELLS, ViewMonth, WEEK_DAYS,
};
pub use error::DateFieldError;
pub use infer::{LocaleFormatInferencer, REFERENCE_DATE};
pub use locale::{
    DatePart, PartKind, format_short, format_to_parts, has_locale_data, icu_locale, month_names,
    weekday_names,
};
pub use parse::{
    DateTextParser, MAX_YEAR, MIN_YEAR, expand_two_digit_year, generic_parse, parse_canonical,
    positional_parse, to_canonical,
};
pub use pattern::{DateField, FormatPattern, PatternToken};
pub use validate::{FormatValidator, ShapeStatus, required_error, shape_regex};
pub use widget::{DATE_FORMAT_ERROR, DATE_FORMAT_MESSAGE, DateFieldState, DateInput};

/// Result type for date field operations
pub type Result<T> = std::result::Result<T, DateFieldError>;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        CalendarGridBuilder, DateInput, DateTextParser, FieldError, FormControl, FormatPattern,
        FormatValidator, LocaleFormatInferencer, ReactiveBinding, Result, ValueAccessor, ViewMonth,
    };
}
