//! Locale format inference.
//!
//! Derives a culture's numeric date pattern by formatting a reference date with
//! the culture's own formatter and reading back the parts it produced.

use crate::locale::{self, DatePart, PartKind};
use crate::{DateField, DateFieldError, FormatPattern, PatternToken, Result};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Reference date used for inference: year, month and day are all distinct.
pub const REFERENCE_DATE: (i32, u32, u32) = (2020, 1, 15);

/// Derives and caches [`FormatPattern`]s per culture.
#[derive(Debug, Default)]
pub struct LocaleFormatInferencer {
    cache: RwLock<HashMap<String, FormatPattern>>,
}

impl LocaleFormatInferencer {
    /// Create an inferencer with an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pattern for `culture`, e.g. `mm/dd/yyyy` for `en-US`, `dd/mm/yyyy` for `it-IT`.
    ///
    /// Fails only for culture codes that cannot be parsed, that have no locale
    /// data of their own, or whose formatter does not produce all three fields.
    pub fn infer_pattern(&self, culture: &str) -> Result<FormatPattern> {
        if let Some(pattern) = self.cache.read().get(culture) {
            return Ok(pattern.clone());
        }

        let pattern = derive_pattern(culture)?;
        debug!(culture, pattern = %pattern, "Inferred date pattern");
        self.cache
            .write()
            .insert(culture.to_string(), pattern.clone());
        Ok(pattern)
    }

    /// Field order for `culture`.
    pub fn field_order(&self, culture: &str) -> Result<[DateField; 3]> {
        Ok(self.infer_pattern(culture)?.field_order())
    }

    /// Number of cultures with a cached pattern.
    pub fn cached_cultures(&self) -> usize {
        self.cache.read().len()
    }
}

fn reference_date() -> Result<NaiveDate> {
    let (y, m, d) = REFERENCE_DATE;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| DateFieldError::Formatter("invalid reference date".to_string()))
}

fn derive_pattern(culture: &str) -> Result<FormatPattern> {
    let icu_locale = locale::icu_locale(culture)?;
    if !locale::has_locale_data(&icu_locale)? {
        return Err(DateFieldError::UnknownCulture(culture.to_string()));
    }
    let parts = locale::format_to_parts(&icu_locale, reference_date()?)?;
    pattern_from_parts(culture, parts)
}

fn pattern_from_parts(culture: &str, parts: Vec<DatePart>) -> Result<FormatPattern> {
    let tokens = parts
        .into_iter()
        .map(|part| match part.kind {
            PartKind::Year => PatternToken::Field(DateField::Year),
            PartKind::Month => PatternToken::Field(DateField::Month),
            PartKind::Day => PatternToken::Field(DateField::Day),
            PartKind::Literal => PatternToken::Literal(part.value),
        })
        .collect();

    FormatPattern::new(tokens).map_err(|e| match e {
        DateFieldError::InvalidPattern { reason, .. } => DateFieldError::PatternUnavailable {
            culture: culture.to_string(),
            reason,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_en_us_and_it_it() {
        let inferencer = LocaleFormatInferencer::new();
        assert_eq!(inferencer.infer_pattern("en-US").unwrap().to_string(), "mm/dd/yyyy");
        assert_eq!(inferencer.infer_pattern("it-IT").unwrap().to_string(), "dd/mm/yyyy");
    }

    #[test]
    fn test_field_order() {
        let inferencer = LocaleFormatInferencer::new();
        assert_eq!(
            inferencer.field_order("it-IT").unwrap(),
            [DateField::Day, DateField::Month, DateField::Year]
        );
    }

    #[test]
    fn test_results_are_cached() {
        let inferencer = LocaleFormatInferencer::new();
        let first = inferencer.infer_pattern("en-US").unwrap();
        let second = inferencer.infer_pattern("en-US").unwrap();
        assert_eq!(first, second);
        assert_eq!(inferencer.cached_cultures(), 1);
    }

    #[test]
    fn test_invalid_culture_is_an_error() {
        let inferencer = LocaleFormatInferencer::new();
        assert!(matches!(
            inferencer.infer_pattern("not-a-culture"),
            Err(DateFieldError::UnknownCulture(_))
        ));
        assert_eq!(inferencer.cached_cultures(), 0);
    }

    #[test]
    fn test_non_gregorian_and_non_latin_locales() {
        let inferencer = LocaleFormatInferencer::new();
        for culture in ["th-TH", "ar-EG"] {
            assert_eq!(
                inferencer.field_order(culture).unwrap(),
                [DateField::Day, DateField::Month, DateField::Year],
                "{culture}"
            );
        }
        assert_eq!(
            inferencer.field_order("fa-IR").unwrap(),
            [DateField::Year, DateField::Month, DateField::Day]
        );

        let pattern = inferencer.infer_pattern("ar-EG").unwrap();
        assert!(pattern.to_string().is_ascii(), "{pattern}");
    }

    #[test]
    fn test_culture_without_locale_data_is_unknown() {
        let inferencer = LocaleFormatInferencer::new();
        assert!(matches!(
            inferencer.infer_pattern("xx-XX"),
            Err(DateFieldError::UnknownCulture(_))
        ));
        assert!(inferencer.infer_pattern("it-CH").is_ok());
    }

    #[test]
    fn test_missing_field_reports_culture_once() {
        let parts = vec![
            DatePart::new(PartKind::Day, "15"),
            DatePart::new(PartKind::Literal, "/"),
            DatePart::new(PartKind::Month, "1"),
        ];
        let err = pattern_from_parts("th-TH", parts).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot derive a date pattern for th-TH: expected exactly one yyyy field, found 0"
        );
    }
}
