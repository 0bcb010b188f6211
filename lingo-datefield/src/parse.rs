//! Free-text date parsing.
//!
//! Two tiers, tried in order:
//!
//! 1. **Generic**: locale-independent formats (ISO-like, RFC 3339, RFC 2822,
//!    English long forms). Accepted whatever the culture's pattern is.
//! 2. **Positional**: three numeric groups read in the culture's field order,
//!    with two-digit years pivoted around 50.
//!
//! Neither tier accepts `mm/dd/yyyy` on its own authority, so a day-first
//! culture never sees `03/04/2024` read as March 4th.

use crate::{DateField, DateFieldError, LocaleFormatInferencer, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

/// Smallest year the positional tier accepts.
pub const MIN_YEAR: i32 = 1900;
/// Largest year the positional tier accepts.
pub const MAX_YEAR: i32 = 2200;

static ISO_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}([-/.])\d{1,2}([-/.])\d{1,2}$").unwrap());

static GROUP_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

const LONG_FORMS: &[&str] = &["%B %d, %Y", "%b %d, %Y", "%d %B %Y", "%d %b %Y", "%A, %B %d, %Y"];

/// Parse a canonical `YYYY-MM-DD` value.
pub fn parse_canonical(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Render a date as its canonical `YYYY-MM-DD` value.
pub fn to_canonical(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Expand a two-digit year: below 50 is 20xx, otherwise 19xx.
pub fn expand_two_digit_year(year: i32) -> i32 {
    if year < 50 { 2000 + year } else { 1900 + year }
}

/// Converts free text into calendar dates for a culture.
#[derive(Debug, Clone)]
pub struct DateTextParser {
    inferencer: Arc<LocaleFormatInferencer>,
}

impl DateTextParser {
    /// Create a parser sharing `inferencer`'s pattern cache.
    pub fn new(inferencer: Arc<LocaleFormatInferencer>) -> Self {
        Self { inferencer }
    }

    /// Parse `raw` for `culture`.
    ///
    /// `Ok(None)` means "not (yet) a valid date". `Err` is reserved for culture
    /// codes without usable locale data.
    pub fn parse(&self, raw: &str, culture: &str) -> Result<Option<NaiveDate>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        if let Some(date) = generic_parse(raw) {
            return Ok(Some(date));
        }

        let order = self.inferencer.field_order(culture)?;
        Ok(positional_parse(raw, order))
    }

    /// Parse to the canonical `YYYY-MM-DD` form.
    pub fn parse_canonical(&self, raw: &str, culture: &str) -> Result<Option<String>> {
        Ok(self.parse(raw, culture)?.map(to_canonical))
    }

    /// Format a canonical value in `culture`'s pattern.
    pub fn format_canonical(&self, value: &str, culture: &str) -> Result<String> {
        let date = parse_canonical(value).ok_or_else(|| DateFieldError::InvalidCanonical(value.to_string()))?;
        Ok(self.inferencer.infer_pattern(culture)?.format(date))
    }
}

/// Locale-independent parse.
pub fn generic_parse(raw: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_LIKE.captures(raw) {
        // Mixed separators such as 2020-01/15 are not dates
        if caps[1] != caps[2] {
            return None;
        }
        let format = format!("%Y{0}%m{0}%d", &caps[1]);
        return NaiveDate::parse_from_str(raw, &format).ok();
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }

    LONG_FORMS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .filter(|date| date.year() >= 1000)
}

/// Positional parse of exactly three numeric groups in `order`.
pub fn positional_parse(raw: &str, order: [DateField; 3]) -> Option<NaiveDate> {
    let groups: Vec<&str> = GROUP_SPLIT.split(raw).filter(|g| !g.is_empty()).collect();
    if groups.len() != 3 {
        return None;
    }

    let (mut year, mut month, mut day) = (None, None, None);
    for (field, group) in order.iter().zip(&groups) {
        if !group.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let value: i32 = group.parse().ok()?;
        match field {
            DateField::Year if group.len() <= 2 => year = Some(expand_two_digit_year(value)),
            DateField::Year => year = Some(value),
            DateField::Month => month = Some(value),
            DateField::Day => day = Some(value),
        }
    }

    let (year, month, day) = (year?, month?, day?);
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}
