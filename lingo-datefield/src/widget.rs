//! Locale-aware date input.
//!
//! [`DateInput`] owns one [`DateFieldState`] and drives it from user events
//! (typing, blur, calendar selection) and from the form framework through
//! [`ValueAccessor`]. Raw text and the canonical value may disagree while the
//! user is typing; they are reconciled on blur, on selection and whenever the
//! model writes a value.

use crate::accessor::{ChangeCallback, FieldError, FormControl, TouchedCallback, ValueAccessor};
use crate::calendar::{CalendarGrid, CalendarGridBuilder, ViewMonth};
use crate::parse::{parse_canonical, to_canonical};
use crate::{DateTextParser, FormatValidator, LocaleFormatInferencer, ReactiveBinding, ShapeStatus};
use chrono::NaiveDate;
use lingo_i18n::{Environment, Subscription, TranslationStore};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Error code for text that does not have the culture's date shape.
pub const DATE_FORMAT_ERROR: &str = "dateFormat";
/// Translation key of the date-format message.
pub const DATE_FORMAT_MESSAGE: &str = "validation.dateFormat";

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Mutable state of one date input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFieldState {
    /// Text as typed or as last rendered
    pub raw_text: String,
    /// `YYYY-MM-DD`, always a real calendar date when set
    pub canonical_value: Option<String>,
    pub is_open: bool,
    pub view_year: i32,
    /// 0-based
    pub view_month: u32,
    pub disabled: bool,
    pub touched: bool,
}

impl DateFieldState {
    fn new(today: NaiveDate) -> Self {
        let view = ViewMonth::of(today);
        Self {
            raw_text: String::new(),
            canonical_value: None,
            is_open: false,
            view_year: view.year,
            view_month: view.month,
            disabled: false,
            touched: false,
        }
    }

    fn view(&self) -> ViewMonth {
        ViewMonth {
            year: self.view_year,
            month: self.view_month,
        }
    }

    fn set_view(&mut self, view: ViewMonth) {
        self.view_year = view.year;
        self.view_month = view.month;
    }
}

/// A date input bound to the active culture.
pub struct DateInput {
    id: String,
    state: Arc<Mutex<DateFieldState>>,
    binding: Arc<ReactiveBinding>,
    parser: DateTextParser,
    validator: Arc<FormatValidator>,
    grid_builder: CalendarGridBuilder,
    environment: Arc<dyn Environment>,
    control: Option<Arc<dyn FormControl>>,
    on_change: Option<ChangeCallback>,
    on_touched: Option<TouchedCallback>,
    min: Option<String>,
    max: Option<String>,
    _culture_watch: Subscription,
}

impl std::fmt::Debug for DateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateInput")
            .field("id", &self.id)
            .field("state", &*self.state.lock())
            .field("min", &self.min)
            .field("max", &self.max)
            .finish()
    }
}

impl DateInput {
    /// Create an input following `store`'s active culture.
    pub fn new(store: &TranslationStore, inferencer: Arc<LocaleFormatInferencer>) -> Self {
        let binding = Arc::new(ReactiveBinding::from_store(store, Arc::clone(&inferencer)));
        Self::with_parts(
            binding,
            DateTextParser::new(inferencer),
            Arc::new(FormatValidator::new()),
            CalendarGridBuilder::new(),
            store.environment(),
        )
    }

    /// Create an input from explicit collaborators.
    pub fn with_parts(
        binding: Arc<ReactiveBinding>,
        parser: DateTextParser,
        validator: Arc<FormatValidator>,
        grid_builder: CalendarGridBuilder,
        environment: Arc<dyn Environment>,
    ) -> Self {
        let id = format!("lingo-date-input-{}", NEXT_ID.fetch_add(1, Ordering::Relaxed));
        let state = Arc::new(Mutex::new(DateFieldState::new(grid_builder.today())));

        let weak_state: Weak<Mutex<DateFieldState>> = Arc::downgrade(&state);
        let weak_binding: Weak<ReactiveBinding> = Arc::downgrade(&binding);
        let culture_watch = binding.culture_signal().subscribe(move |_| {
            let (Some(state), Some(binding)) = (weak_state.upgrade(), weak_binding.upgrade()) else {
                return;
            };
            let mut state = state.lock();
            if state.canonical_value.is_some() {
                state.raw_text = binding.display_text();
            }
        });

        Self {
            id,
            state,
            binding,
            parser,
            validator,
            grid_builder,
            environment,
            control: None,
            on_change: None,
            on_touched: None,
            min: None,
            max: None,
            _culture_watch: culture_watch,
        }
    }

    /// Restrict selectable dates to `[min, max]` (canonical values, inclusive).
    pub fn with_bounds(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.min = min.map(str::to_string);
        self.max = max.map(str::to_string);
        self
    }

    /// Attach the parent form control receiving values and errors.
    pub fn attach_control(&mut self, control: Arc<dyn FormControl>) {
        self.control = Some(control);
    }

    /// Owner id used for the backdrop.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshot of the state.
    pub fn state(&self) -> DateFieldState {
        self.state.lock().clone()
    }

    pub fn raw_text(&self) -> String {
        self.state.lock().raw_text.clone()
    }

    pub fn canonical_value(&self) -> Option<String> {
        self.state.lock().canonical_value.clone()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().is_open
    }

    pub fn is_disabled(&self) -> bool {
        self.state.lock().disabled
    }

    /// Month shown by the calendar.
    pub fn view_month(&self) -> ViewMonth {
        self.state.lock().view()
    }

    pub fn binding(&self) -> &ReactiveBinding {
        &self.binding
    }

    /// Input hint for the active culture.
    pub fn placeholder(&self) -> String {
        self.binding.format_pattern().placeholder()
    }

    pub fn month_names(&self) -> Vec<String> {
        self.binding.month_names()
    }

    pub fn weekday_names(&self) -> Vec<String> {
        self.binding.weekday_names()
    }

    /// Calendar grid for the view month.
    pub fn grid(&self) -> CalendarGrid {
        let state = self.state.lock();
        self.grid_builder.build_grid(
            state.view(),
            state.canonical_value.as_deref(),
            self.min.as_deref(),
            self.max.as_deref(),
        )
    }

    /// Handle a keystroke: `raw` is the full current text.
    pub fn input(&mut self, raw: &str) {
        if self.is_disabled() {
            return;
        }
        self.state.lock().raw_text = raw.to_string();

        let trimmed = raw.trim();
        let culture = self.binding.culture_code();
        let parsed = self.parser.parse(trimmed, &culture).unwrap_or_else(|e| {
            warn!(culture = %culture, error = %e, "Cannot parse date for culture");
            None
        });

        match parsed {
            Some(date) => {
                self.state.lock().set_view(ViewMonth::of(date));
                self.commit(Some(date), true);
                self.set_format_error(false);
            }
            None => {
                self.commit(None, true);
                let status = self.validator.classify(trimmed, &self.binding.format_pattern());
                self.set_format_error(status == ShapeStatus::Mismatch);
            }
        }
    }

    /// Handle focus loss: reconcile text with the value and flag unfinished text.
    pub fn blur(&mut self) {
        let raw = {
            let mut state = self.state.lock();
            state.touched = true;
            if state.canonical_value.is_some() {
                state.raw_text = self.binding.display_text();
            }
            state.raw_text.clone()
        };
        if let Some(on_touched) = &self.on_touched {
            on_touched();
        }

        if self.canonical_value().is_none() {
            let status = self.validator.classify(raw.trim(), &self.binding.format_pattern());
            self.set_format_error(matches!(status, ShapeStatus::Partial | ShapeStatus::Mismatch));
        }
    }

    /// Open the calendar on the selected month (or today's).
    pub fn open(&mut self) {
        let mut state = self.state.lock();
        if state.disabled || state.is_open {
            return;
        }
        let view = state
            .canonical_value
            .as_deref()
            .and_then(parse_canonical)
            .map(ViewMonth::of)
            .unwrap_or_else(|| ViewMonth::of(self.grid_builder.today()));
        state.set_view(view);
        state.is_open = true;
        drop(state);

        self.environment.attach_backdrop(&self.id);
        debug!(id = %self.id, "Calendar opened");
    }

    /// Close the calendar and release the backdrop.
    pub fn close(&mut self) {
        let was_open = std::mem::replace(&mut self.state.lock().is_open, false);
        if was_open {
            self.environment.detach_backdrop(&self.id);
            debug!(id = %self.id, "Calendar closed");
        }
    }

    pub fn toggle(&mut self) {
        if self.is_open() { self.close() } else { self.open() }
    }

    pub fn next_month(&mut self) {
        let mut state = self.state.lock();
        let view = state.view().next();
        state.set_view(view);
    }

    pub fn previous_month(&mut self) {
        let mut state = self.state.lock();
        let view = state.view().previous();
        state.set_view(view);
    }

    /// Show an arbitrary month; `month` is 0-based and normalized.
    pub fn show_month(&mut self, year: i32, month: i32) {
        self.state.lock().set_view(ViewMonth::new(year, month));
    }

    /// Pick a day from the calendar. Returns false for disabled or invalid days.
    pub fn select(&mut self, iso_date: &str) -> bool {
        if self.is_disabled() {
            return false;
        }
        let Some(date) = parse_canonical(iso_date) else {
            return false;
        };
        let bounds = |bound: &Option<String>| bound.as_deref().and_then(parse_canonical);
        if bounds(&self.min).is_some_and(|min| date < min) || bounds(&self.max).is_some_and(|max| date > max) {
            return false;
        }

        self.commit(Some(date), true);
        {
            let mut state = self.state.lock();
            state.raw_text = self.binding.display_text();
            state.set_view(ViewMonth::of(date));
            state.touched = true;
        }
        self.set_format_error(false);
        if let Some(on_touched) = &self.on_touched {
            on_touched();
        }
        self.close();
        true
    }

    /// Select today's date.
    pub fn select_today(&mut self) -> bool {
        let today = to_canonical(self.grid_builder.today());
        self.select(&today)
    }

    /// Remove the value and the text.
    pub fn clear(&mut self) {
        if self.is_disabled() {
            return;
        }
        self.state.lock().raw_text.clear();
        self.commit(None, true);
        self.set_format_error(false);
    }

    /// Store a value; notify the form only when `notify` is set and the
    /// value actually changed.
    fn commit(&mut self, date: Option<NaiveDate>, notify: bool) {
        let canonical = date.map(to_canonical);
        let changed = {
            let mut state = self.state.lock();
            let changed = state.canonical_value != canonical;
            state.canonical_value = canonical.clone();
            changed
        };
        self.binding.set_value(date);

        if notify && changed {
            if let Some(control) = &self.control {
                control.set_value(canonical.clone());
            }
            if let Some(on_change) = &self.on_change {
                on_change(canonical);
            }
        }
    }

    fn set_format_error(&self, invalid: bool) {
        let Some(control) = &self.control else {
            return;
        };
        let mut errors = control.errors();
        if invalid {
            let error = FieldError::new(DATE_FORMAT_ERROR, DATE_FORMAT_MESSAGE)
                .with_param("format", self.placeholder());
            errors.insert(DATE_FORMAT_ERROR.to_string(), error);
        } else if errors.remove(DATE_FORMAT_ERROR).is_none() {
            return;
        }
        control.set_errors(errors);
    }
}

impl ValueAccessor for DateInput {
    fn write_value(&mut self, value: Option<&str>) {
        let date = value.and_then(|v| {
            let parsed = parse_canonical(v);
            if parsed.is_none() {
                warn!(id = %self.id, value = v, "Ignoring non-canonical model value");
            }
            parsed
        });

        self.commit(date, false);
        let mut state = self.state.lock();
        state.raw_text = self.binding.display_text();
        if let Some(date) = date {
            state.set_view(ViewMonth::of(date));
        }
    }

    fn register_on_change(&mut self, callback: ChangeCallback) {
        self.on_change = Some(callback);
    }

    fn register_on_touched(&mut self, callback: TouchedCallback) {
        self.on_touched = Some(callback);
    }

    fn set_disabled(&mut self, disabled: bool) {
        self.state.lock().disabled = disabled;
        if disabled {
            self.close();
        }
    }
}

impl Drop for DateInput {
    fn drop(&mut self) {
        if self.state.lock().is_open {
            self.environment.detach_backdrop(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryFormControl;
    use lingo_i18n::{Culture, MemoryEnvironment, Signal};

    struct Fixture {
        culture: Signal<Option<Culture>>,
        environment: Arc<MemoryEnvironment>,
        control: Arc<MemoryFormControl>,
        changes: Arc<Mutex<Vec<Option<String>>>>,
        today: Arc<Mutex<NaiveDate>>,
        input: DateInput,
    }

    fn fixture(code: &str) -> Fixture {
        let culture = Signal::new(Some(Culture::new(code, code, false)));
        let inferencer = Arc::new(LocaleFormatInferencer::new());
        let binding = Arc::new(ReactiveBinding::new(culture.clone(), Arc::clone(&inferencer), "en-US"));
        let environment = Arc::new(MemoryEnvironment::new());
        let today = Arc::new(Mutex::new(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()));
        let clock = Arc::clone(&today);

        let mut input = DateInput::with_parts(
            binding,
            DateTextParser::new(inferencer),
            Arc::new(FormatValidator::new()),
            CalendarGridBuilder::with_clock(move || *clock.lock()),
            environment.clone(),
        );
        let control = Arc::new(MemoryFormControl::new());
        input.attach_control(control.clone());

        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&changes);
        input.register_on_change(Box::new(move |v| sink.lock().push(v)));

        Fixture {
            culture,
            environment,
            control,
            changes,
            today,
            input,
        }
    }

    #[test]
    fn test_typing_a_full_date_emits_canonical_value() {
        let mut f = fixture("en-US");
        f.input.input("03/2");
        assert_eq!(f.input.canonical_value(), None);
        assert!(!f.control.has_error(DATE_FORMAT_ERROR));

        f.input.input("03/25/2024");
        assert_eq!(f.input.canonical_value().as_deref(), Some("2024-03-25"));
        assert_eq!(f.control.value().as_deref(), Some("2024-03-25"));
        assert_eq!(*f.changes.lock(), vec![Some("2024-03-25".to_string())]);
        assert_eq!(f.input.view_month(), ViewMonth { year: 2024, month: 2 });
    }

    #[test]
    fn test_mismatch_sets_format_error() {
        let mut f = fixture("en-US");
        f.input.input("03-25");
        assert!(f.control.has_error(DATE_FORMAT_ERROR));
        let errors = f.control.errors();
        assert_eq!(errors[DATE_FORMAT_ERROR].params.get("format"), Some("mm/dd/yyyy"));

        f.input.input("03/25/2024");
        assert!(!f.control.has_error(DATE_FORMAT_ERROR));
    }

    #[test]
    fn test_blur_flags_partial_text_and_reconciles_valid_text() {
        let mut f = fixture("en-US");
        f.input.input("03/25");
        f.input.blur();
        assert!(f.control.has_error(DATE_FORMAT_ERROR));

        f.input.input("3/5/24");
        assert_eq!(f.input.raw_text(), "3/5/24");
        f.input.blur();
        assert_eq!(f.input.raw_text(), "03/05/2024");
        assert!(!f.control.has_error(DATE_FORMAT_ERROR));
        assert!(f.input.state().touched);
    }

    #[test]
    fn test_write_value_does_not_echo() {
        let mut f = fixture("it-IT");
        f.input.write_value(Some("2024-03-04"));
        assert_eq!(f.input.raw_text(), "04/03/2024");
        assert!(f.changes.lock().is_empty());

        f.input.write_value(Some("2024-02-30"));
        assert_eq!(f.input.canonical_value(), None);
        assert_eq!(f.input.raw_text(), "");
    }

    #[test]
    fn test_culture_change_rerenders_text_only() {
        let f = fixture("en-US");
        let mut input = f.input;
        input.write_value(Some("2024-03-25"));
        assert_eq!(input.raw_text(), "03/25/2024");

        f.culture.set(Some(Culture::new("it-IT", "Italiano", false)));
        assert_eq!(input.raw_text(), "25/03/2024");
        assert_eq!(input.canonical_value().as_deref(), Some("2024-03-25"));
        assert_eq!(input.placeholder(), "dd/mm/yyyy");
    }

    #[test]
    fn test_open_close_manage_backdrop() {
        let mut f = fixture("en-US");
        f.input.open();
        assert!(f.input.is_open());
        assert_eq!(f.environment.attached_backdrops(), vec![f.input.id().to_string()]);

        f.input.toggle();
        assert!(!f.input.is_open());
        assert!(f.environment.attached_backdrops().is_empty());
    }

    #[test]
    fn test_drop_releases_backdrop() {
        let f = fixture("en-US");
        let environment = f.environment.clone();
        let mut input = f.input;
        input.open();
        assert_eq!(environment.attached_backdrops().len(), 1);
        drop(input);
        assert!(environment.attached_backdrops().is_empty());
    }

    #[test]
    fn test_select_respects_bounds_and_closes() {
        let f = fixture("en-US");
        let mut input = f.input.with_bounds(Some("2024-02-10"), Some("2024-02-20"));
        input.open();

        assert!(!input.select("2024-02-09"));
        assert!(input.is_open());

        assert!(input.select("2024-02-10"));
        assert!(!input.is_open());
        assert_eq!(input.raw_text(), "02/10/2024");
        assert_eq!(f.control.value().as_deref(), Some("2024-02-10"));
        assert!(f.environment.attached_backdrops().is_empty());
    }

    #[test]
    fn test_select_today_and_clear() {
        let mut f = fixture("en-US");
        assert!(f.input.select_today());
        assert_eq!(f.input.canonical_value().as_deref(), Some("2024-02-14"));

        f.input.clear();
        assert_eq!(f.input.canonical_value(), None);
        assert_eq!(f.input.raw_text(), "");
        assert_eq!(*f.changes.lock(), vec![Some("2024-02-14".to_string()), None]);
    }

    #[test]
    fn test_today_moves_with_the_clock_while_mounted() {
        let mut f = fixture("en-US");
        f.input.open();
        *f.today.lock() = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();

        let grid = f.input.grid();
        let today: Vec<&str> = grid.cells.iter().filter(|c| c.is_today).map(|c| c.iso_date.as_str()).collect();
        assert_eq!(today, ["2024-02-15"]);

        assert!(f.input.select_today());
        assert_eq!(f.input.canonical_value().as_deref(), Some("2024-02-15"));
    }

    #[test]
    fn test_grid_and_navigation() {
        let mut f = fixture("en-US");
        f.input.write_value(Some("2024-02-20"));
        let grid = f.input.grid();
        assert_eq!(grid.len(), 42);
        assert!(grid.cells.iter().any(|c| c.is_selected && c.iso_date == "2024-02-20"));

        f.input.next_month();
        assert_eq!(f.input.view_month(), ViewMonth { year: 2024, month: 2 });
        f.input.show_month(2024, 12);
        assert_eq!(f.input.view_month(), ViewMonth { year: 2025, month: 0 });
        f.input.previous_month();
        assert_eq!(f.input.view_month(), ViewMonth { year: 2024, month: 11 });
    }

    #[test]
    fn test_disabled_ignores_input() {
        let mut f = fixture("en-US");
        f.input.set_disabled(true);
        f.input.input("03/25/2024");
        f.input.open();
        assert_eq!(f.input.canonical_value(), None);
        assert!(!f.input.is_open());
        assert!(!f.input.select("2024-02-14"));
    }
}
