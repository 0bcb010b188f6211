//! Calendar grid.
//!
//! A month view is always 6 rows of 7 days starting on the Sunday on or before
//! the 1st, borrowing leading days from the previous month and trailing days
//! from the next.

use crate::parse::{parse_canonical, to_canonical};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Cells per grid.
pub const GRID_CELLS: usize = 42;
/// Cells per row.
pub const WEEK_DAYS: usize = 7;

/// A displayed month; `month` is 0-based (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ViewMonth {
    pub year: i32,
    pub month: u32,
}

impl ViewMonth {
    /// Create a view month, normalizing out-of-range months into
    /// neighbouring years (month 12 of 2024 is January 2025).
    pub fn new(year: i32, month: i32) -> Self {
        Self {
            year: year + month.div_euclid(12),
            month: month.rem_euclid(12).unsigned_abs(),
        }
    }

    /// Month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    /// Following month.
    pub fn next(self) -> Self {
        Self::new(self.year, self.month_i32() + 1)
    }

    /// Preceding month.
    pub fn previous(self) -> Self {
        Self::new(self.year, self.month_i32() - 1)
    }

    /// First day of the month.
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
    }

    fn month_i32(self) -> i32 {
        i32::try_from(self.month).unwrap_or(0)
    }
}

/// One day in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarCell {
    pub day: u32,
    pub iso_date: String,
    pub in_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_disabled: bool,
    #[serde(skip)]
    pub date: NaiveDate,
}

/// A 42-cell month view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarGrid {
    pub month: ViewMonth,
    pub cells: Vec<CalendarCell>,
}

impl CalendarGrid {
    /// The six weeks of the grid.
    pub fn rows(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(WEEK_DAYS)
    }

    /// Number of cells (always 42).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Source of the current calendar date.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Builds month grids. "Today" is read from the clock on every call, so a
/// long-lived builder keeps up with the date.
#[derive(Clone)]
pub struct CalendarGridBuilder {
    clock: Clock,
}

impl fmt::Debug for CalendarGridBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarGridBuilder")
            .field("today", &self.today())
            .finish()
    }
}

impl Default for CalendarGridBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarGridBuilder {
    /// Builder reading the local calendar date.
    pub fn new() -> Self {
        Self::with_clock(|| chrono::Local::now().date_naive())
    }

    /// Builder with a fixed "today".
    pub fn with_today(today: NaiveDate) -> Self {
        Self::with_clock(move || today)
    }

    /// Builder reading "today" from `clock`.
    pub fn with_clock(clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        Self { clock: Arc::new(clock) }
    }

    /// The date treated as today, read now.
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Build the grid for `month`.
    ///
    /// `selected`, `min` and `max` are canonical `YYYY-MM-DD` values; unparseable
    /// bounds are ignored. In-month days are disabled when strictly before `min`
    /// or strictly after `max`; out-of-month days are always disabled.
    pub fn build_grid(
        &self,
        month: ViewMonth,
        selected: Option<&str>,
        min: Option<&str>,
        max: Option<&str>,
    ) -> CalendarGrid {
        let today = self.today();
        let selected = selected.and_then(parse_canonical);
        let min = parse_bound("min", min);
        let max = parse_bound("max", max);

        let Some(first) = month.first_day() else {
            warn!(year = month.year, "Calendar month outside the supported range");
            return CalendarGrid {
                month,
                cells: Vec::new(),
            };
        };
        let start = first - Days::new(u64::from(first.weekday().num_days_from_sunday()));

        let cells = start
            .iter_days()
            .take(GRID_CELLS)
            .map(|date| {
                let in_current_month = date.year() == month.year && date.month0() == month.month;
                let out_of_bounds = min.is_some_and(|m| date < m) || max.is_some_and(|m| date > m);
                CalendarCell {
                    day: date.day(),
                    iso_date: to_canonical(date),
                    in_current_month,
                    is_today: date == today,
                    is_selected: selected == Some(date),
                    is_disabled: !in_current_month || out_of_bounds,
                    date,
                }
            })
            .collect();

        CalendarGrid { month, cells }
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> Option<NaiveDate> {
    let value = value?;
    let parsed = parse_canonical(value);
    if parsed.is_none() {
        warn!(bound = name, value, "Ignoring unparseable calendar bound");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CalendarGridBuilder {
        CalendarGridBuilder::with_today(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap())
    }

    #[test]
    fn test_always_42_cells() {
        let builder = builder();
        for year in [2023, 2024, 2100] {
            for month in 0..12 {
                let grid = builder.build_grid(ViewMonth::new(year, month), None, None, None);
                assert_eq!(grid.len(), GRID_CELLS, "{year}-{month}");
                assert_eq!(grid.rows().count(), 6);
                assert_eq!(grid.cells[0].date.weekday(), chrono::Weekday::Sun);
            }
        }
    }

    #[test]
    fn test_february_leap_and_non_leap() {
        let builder = builder();
        let leap = builder.build_grid(ViewMonth::new(2024, 1), None, None, None);
        assert_eq!(leap.cells.iter().filter(|c| c.in_current_month).count(), 29);

        let common = builder.build_grid(ViewMonth::new(2023, 1), None, None, None);
        assert_eq!(common.cells.iter().filter(|c| c.in_current_month).count(), 28);
    }

    #[test]
    fn test_anchor_on_sunday_on_or_before_first() {
        // September 2024 starts on a Sunday
        let grid = builder().build_grid(ViewMonth::new(2024, 8), None, None, None);
        assert_eq!(grid.cells[0].iso_date, "2024-09-01");
        assert!(grid.cells[0].in_current_month);

        // February 2024 starts on a Thursday
        let grid = builder().build_grid(ViewMonth::new(2024, 1), None, None, None);
        assert_eq!(grid.cells[0].iso_date, "2024-01-28");
        assert!(!grid.cells[0].in_current_month);
        assert!(grid.cells[0].is_disabled);
    }

    #[test]
    fn test_flags() {
        let grid = builder().build_grid(
            ViewMonth::new(2024, 1),
            Some("2024-02-20"),
            Some("2024-02-10"),
            Some("2024-02-25"),
        );
        let cell = |iso: &str| grid.cells.iter().find(|c| c.iso_date == iso).unwrap();

        assert!(cell("2024-02-14").is_today);
        assert!(cell("2024-02-20").is_selected);
        assert!(cell("2024-02-09").is_disabled);
        assert!(!cell("2024-02-10").is_disabled);
        assert!(!cell("2024-02-25").is_disabled);
        assert!(cell("2024-02-26").is_disabled);
        assert!(cell("2024-03-01").is_disabled);
        assert!(!cell("2024-03-01").in_current_month);
    }

    #[test]
    fn test_bad_bounds_are_ignored() {
        let grid = builder().build_grid(ViewMonth::new(2024, 1), None, Some("garbage"), None);
        assert!(grid.cells.iter().filter(|c| c.in_current_month).all(|c| !c.is_disabled));
    }

    #[test]
    fn test_today_is_read_per_grid() {
        let today = Arc::new(parking_lot::Mutex::new(NaiveDate::from_ymd_opt(2024, 2, 14).unwrap()));
        let clock = Arc::clone(&today);
        let builder = CalendarGridBuilder::with_clock(move || *clock.lock());
        let month = ViewMonth::new(2024, 1);

        let todays = |grid: &CalendarGrid| -> Vec<String> {
            grid.cells.iter().filter(|c| c.is_today).map(|c| c.iso_date.clone()).collect()
        };
        assert_eq!(todays(&builder.build_grid(month, None, None, None)), ["2024-02-14"]);

        *today.lock() = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        assert_eq!(builder.today(), NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        assert_eq!(todays(&builder.build_grid(month, None, None, None)), ["2024-02-15"]);
    }

    #[test]
    fn test_view_month_navigation() {
        assert_eq!(ViewMonth::new(2024, 12), ViewMonth { year: 2025, month: 0 });
        assert_eq!(ViewMonth::new(2024, -1), ViewMonth { year: 2023, month: 11 });
        assert_eq!(ViewMonth::new(2024, 11).next(), ViewMonth { year: 2025, month: 0 });
        assert_eq!(ViewMonth::new(2024, 0).previous(), ViewMonth { year: 2023, month: 11 });
    }

    #[test]
    fn test_serializes_camel_case() {
        let grid = builder().build_grid(ViewMonth::new(2024, 1), None, None, None);
        let json = serde_json::to_value(&grid.cells[0]).unwrap();
        assert_eq!(json["isoDate"], "2024-01-28");
        assert_eq!(json["inCurrentMonth"], false);
    }
}
