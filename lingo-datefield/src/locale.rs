//! Locale data backed by ICU4X.
//!
//! Wraps the ICU date formatter and reads its output back as typed parts
//! (year, month, day, literal), using the field annotations the formatter
//! attaches to what it writes.
//!
//! Locales are always resolved with the Gregorian calendar and Latin digits:
//! the date input edits Gregorian dates typed with ASCII digits, whatever the
//! culture's default calendar or numbering system.

use crate::{DateFieldError, Result};
use chrono::{Datelike, NaiveDate};
use icu::calendar::Date;
use icu::datetime::{DateTimeFormatter, fieldsets, parts};
use icu::locale::Locale;
use lingo_i18n::CultureCode;
use once_cell::sync::Lazy;
use std::fmt;
use std::ops::Range;
use writeable::{Part, PartsWrite, Writeable};

/// Kind of a formatted date part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Year,
    Month,
    Day,
    Literal,
}

/// One part of a formatted date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePart {
    pub kind: PartKind,
    pub value: String,
}

impl DatePart {
    pub(crate) fn new(kind: PartKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

const CALENDAR_KEYWORDS: &str = "u-ca-gregory-nu-latn";

/// Resolve a culture code to an ICU locale (Gregorian calendar, Latin digits).
pub fn icu_locale(culture: &str) -> Result<Locale> {
    let code = CultureCode::parse(culture).map_err(|_| DateFieldError::UnknownCulture(culture.to_string()))?;
    format!("{code}-{CALENDAR_KEYWORDS}")
        .parse::<Locale>()
        .map_err(|_| DateFieldError::UnknownCulture(culture.to_string()))
}

static ROOT_MONTHS: Lazy<Vec<String>> = Lazy::new(|| {
    format!("und-{CALENDAR_KEYWORDS}")
        .parse::<Locale>()
        .ok()
        .and_then(|root| month_names(&root).ok())
        .unwrap_or_default()
});

/// Whether ICU has data for `locale` itself or one of its parents, rather than
/// only the root locale it falls back to for unknown languages.
pub fn has_locale_data(locale: &Locale) -> Result<bool> {
    Ok(month_names(locale)? != *ROOT_MONTHS)
}

fn icu_date(date: NaiveDate) -> Result<Date<icu::calendar::Iso>> {
    let month = u8::try_from(date.month()).map_err(|e| DateFieldError::Formatter(e.to_string()))?;
    let day = u8::try_from(date.day()).map_err(|e| DateFieldError::Formatter(e.to_string()))?;
    Date::try_new_iso(date.year(), month, day).map_err(|e| DateFieldError::Formatter(format!("{e:?}")))
}

fn short_formatter(locale: &Locale) -> Result<DateTimeFormatter<fieldsets::YMD>> {
    DateTimeFormatter::try_new(locale.clone().into(), fieldsets::YMD::short())
        .map_err(|e| DateFieldError::Formatter(format!("{e:?}")))
}

/// Format `date` in the locale's short numeric style (e.g. `1/15/20`, `15/01/20`).
pub fn format_short(locale: &Locale, date: NaiveDate) -> Result<String> {
    Ok(short_formatter(locale)?.format(&icu_date(date)?).to_string())
}

/// Format `date` in the locale's short style and split it into parts, in the
/// order the formatter wrote them.
///
/// Text between fields becomes literal parts, with bidi control marks removed.
pub fn format_to_parts(locale: &Locale, date: NaiveDate) -> Result<Vec<DatePart>> {
    let mut collector = PartCollector::default();
    short_formatter(locale)?
        .format(&icu_date(date)?)
        .write_to_parts(&mut collector)
        .map_err(|_| DateFieldError::Formatter("formatter failed to write parts".to_string()))?;
    Ok(collector.into_parts())
}

/// Records the byte range of every year, month and day field written.
#[derive(Debug, Default)]
struct PartCollector {
    text: String,
    fields: Vec<(Range<usize>, PartKind)>,
}

impl fmt::Write for PartCollector {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.text.push_str(s);
        Ok(())
    }
}

impl PartsWrite for PartCollector {
    type SubPartsWrite = Self;

    fn with_part(
        &mut self,
        part: Part,
        mut f: impl FnMut(&mut Self::SubPartsWrite) -> fmt::Result,
    ) -> fmt::Result {
        let start = self.text.len();
        f(self)?;
        if let Some(kind) = field_kind(part) {
            self.fields.push((start..self.text.len(), kind));
        }
        Ok(())
    }
}

fn field_kind(part: Part) -> Option<PartKind> {
    if part == parts::YEAR {
        Some(PartKind::Year)
    } else if part == parts::MONTH {
        Some(PartKind::Month)
    } else if part == parts::DAY {
        Some(PartKind::Day)
    } else {
        None
    }
}

impl PartCollector {
    fn into_parts(mut self) -> Vec<DatePart> {
        // Nested parts close first
        self.fields.sort_by_key(|(range, _)| range.start);

        let mut parts = Vec::new();
        let mut cursor = 0;
        for (range, kind) in &self.fields {
            if range.start < cursor {
                continue;
            }
            push_literal(&mut parts, &self.text[cursor..range.start]);
            parts.push(DatePart::new(*kind, &self.text[range.clone()]));
            cursor = range.end;
        }
        push_literal(&mut parts, &self.text[cursor..]);
        parts
    }
}

fn is_bidi_mark(c: char) -> bool {
    matches!(c, '\u{200e}' | '\u{200f}' | '\u{061c}')
}

fn push_literal(parts: &mut Vec<DatePart>, text: &str) {
    let literal: String = text.chars().filter(|c| !is_bidi_mark(*c)).collect();
    if !literal.is_empty() {
        parts.push(DatePart::new(PartKind::Literal, literal));
    }
}

/// Localized month names, January first.
///
/// Derived from the locale's long month-day format with the day removed, so
/// they are the forms used inside dates.
pub fn month_names(locale: &Locale) -> Result<Vec<String>> {
    let formatter = DateTimeFormatter::try_new(locale.clone().into(), fieldsets::MD::long())
        .map_err(|e| DateFieldError::Formatter(format!("{e:?}")))?;

    (1..=12)
        .map(|month| {
            let date = NaiveDate::from_ymd_opt(2020, month, 15)
                .ok_or_else(|| DateFieldError::Formatter(format!("invalid month {month}")))?;
            let text = formatter.format(&icu_date(date)?).to_string();
            Ok(strip_day(&text))
        })
        .collect()
}

fn strip_day(text: &str) -> String {
    let without_digits: String = text.chars().filter(|c| !c.is_ascii_digit()).collect();
    without_digits
        .trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation() || is_bidi_mark(c))
        .to_string()
}

/// Localized abbreviated weekday names, Sunday first.
pub fn weekday_names(locale: &Locale) -> Result<Vec<String>> {
    let formatter = DateTimeFormatter::try_new(locale.clone().into(), fieldsets::E::medium())
        .map_err(|e| DateFieldError::Formatter(format!("{e:?}")))?;

    // 2020-01-05 was a Sunday
    (5..12)
        .map(|day| {
            let date = NaiveDate::from_ymd_opt(2020, 1, day)
                .ok_or_else(|| DateFieldError::Formatter(format!("invalid day {day}")))?;
            Ok(formatter.format(&icu_date(date)?).to_string())
        })
        .collect()
}
