//! Cultures and Culture Codes
//!
//! A [`Culture`] is one entry of the server's culture catalogue. A
//! [`CultureCode`] is a validated `code` such as `it-IT`; it is what the store
//! checks before switching and what preferences are negotiated against.

use crate::{I18nError, Result};
use icu::locale::LanguageIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of the culture catalogue (`GET /translations/cultures`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Culture {
    /// Culture code, e.g. `en-US`
    pub code: String,
    /// Display name, e.g. `English (United States)`
    pub name: String,
    /// Whether the server marks this culture as the default
    #[serde(default)]
    pub is_default: bool,
}

impl Culture {
    /// Create a culture entry.
    pub fn new(code: impl Into<String>, name: impl Into<String>, is_default: bool) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            is_default,
        }
    }

    /// Parse this culture's code.
    pub fn culture_code(&self) -> Result<CultureCode> {
        CultureCode::parse(&self.code)
    }
}

/// Validated culture code: a language, optionally followed by a script and a
/// region.
///
/// Parsing goes through ICU's language identifier, so subtag case is
/// canonicalised (`zh-hans-cn` becomes `zh-Hans-CN`). Codes with variants or
/// extensions, the undetermined language, and long language subtags are
/// rejected: the catalogue never serves them.
///
/// ```
/// use lingo_i18n::CultureCode;
///
/// let it = CultureCode::parse("it_it").unwrap();
/// assert_eq!(it.tag(), "it-IT");
/// assert_eq!(it.region(), Some("IT"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CultureCode(LanguageIdentifier);

impl CultureCode {
    /// Parse a catalogue code. `_` is accepted as a separator.
    pub fn parse(code: &str) -> Result<Self> {
        let invalid = || I18nError::InvalidCulture(code.to_string());

        let id = LanguageIdentifier::try_from_str(&code.trim().replace('_', "-")).map_err(|_| invalid())?;
        let language = id.language.as_str();
        if language.len() > 3 || language == "und" || !id.variants.is_empty() {
            return Err(invalid());
        }
        Ok(Self(id))
    }

    /// Language subtag, e.g. `it`.
    pub fn language(&self) -> &str {
        self.0.language.as_str()
    }

    /// Script subtag, e.g. `Hans`.
    pub fn script(&self) -> Option<&str> {
        self.0.script.as_ref().map(|s| s.as_str())
    }

    /// Region subtag, e.g. `IT` or `419`.
    pub fn region(&self) -> Option<&str> {
        self.0.region.as_ref().map(|r| r.as_str())
    }

    /// Canonical tag, e.g. `zh-Hans-CN`.
    pub fn tag(&self) -> String {
        self.0.to_string()
    }

    /// Underlying ICU identifier.
    pub fn identifier(&self) -> &LanguageIdentifier {
        &self.0
    }

    /// How well this code serves a requested one, or `None` when the
    /// languages differ.
    pub fn closeness_to(&self, requested: &CultureCode) -> Option<Closeness> {
        let (have, want) = (&self.0, &requested.0);
        if have.language != want.language {
            return None;
        }
        let closeness = if have == want {
            Closeness::Exact
        } else if have.region.is_some() && have.region == want.region {
            Closeness::SameRegion
        } else if have.script.is_some() && have.script == want.script {
            Closeness::SameScript
        } else {
            Closeness::SameLanguage
        };
        Some(closeness)
    }
}

impl fmt::Display for CultureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CultureCode {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Degree of agreement between an available and a requested culture code,
/// weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Closeness {
    /// Only the language agrees (`it-IT` for `it-CH`)
    SameLanguage,
    /// Language and script agree
    SameScript,
    /// Language and region agree, script differs
    SameRegion,
    /// Identical codes
    Exact,
}

/// Pick the catalogue culture that best serves the requested codes.
///
/// Requested codes are tried in preference order. The first one that shares a
/// language with any catalogue entry decides; among those entries the closest
/// wins, and ties go to catalogue order.
pub fn negotiate_culture<'a>(requested: &[CultureCode], available: &'a [Culture]) -> Option<&'a Culture> {
    let catalogue: Vec<(&Culture, CultureCode)> = available
        .iter()
        .filter_map(|culture| Some((culture, culture.culture_code().ok()?)))
        .collect();

    requested.iter().find_map(|want| {
        let mut best: Option<(Closeness, &Culture)> = None;
        for (culture, code) in &catalogue {
            let Some(closeness) = code.closeness_to(want) else {
                continue;
            };
            if best.is_none_or(|(held, _)| closeness > held) {
                best = Some((closeness, *culture));
            }
        }
        best.map(|(_, culture)| culture)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<Culture> {
        vec![
            Culture::new("en-US", "English", true),
            Culture::new("en-GB", "English (UK)", false),
            Culture::new("it-IT", "Italiano", false),
            Culture::new("de-DE", "Deutsch", false),
        ]
    }

    fn codes(tags: &[&str]) -> Vec<CultureCode> {
        tags.iter().map(|t| CultureCode::parse(t).unwrap()).collect()
    }

    #[test]
    fn test_parse_code() {
        let en = CultureCode::parse("en").unwrap();
        assert_eq!(en.language(), "en");
        assert!(en.region().is_none());

        let zh = CultureCode::parse("zh-hans-cn").unwrap();
        assert_eq!(zh.script(), Some("Hans"));
        assert_eq!(zh.tag(), "zh-Hans-CN");

        assert_eq!(CultureCode::parse("es-419").unwrap().region(), Some("419"));
        assert_eq!(CultureCode::parse(" pt_br ").unwrap().to_string(), "pt-BR");
    }

    #[test]
    fn test_parse_rejects_codes_outside_catalogue_shape() {
        for code in ["", "e", "english", "en-US-extra!", "und", "de-DE-1996", "not a code", "??"] {
            assert!(
                matches!(CultureCode::parse(code), Err(I18nError::InvalidCulture(_))),
                "{code:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_culture_deserializes_camel_case() {
        let json = r#"[{"code":"it-IT","name":"Italiano","isDefault":true},{"code":"en-US","name":"English"}]"#;
        let cultures: Vec<Culture> = serde_json::from_str(json).unwrap();
        assert!(cultures[0].is_default);
        assert!(!cultures[1].is_default);
    }

    #[test]
    fn test_closeness() {
        let en_us = CultureCode::parse("en-US").unwrap();
        let requested = codes(&["en-US", "en", "es-US", "fr"]);

        assert_eq!(en_us.closeness_to(&requested[0]), Some(Closeness::Exact));
        assert_eq!(en_us.closeness_to(&requested[1]), Some(Closeness::SameLanguage));
        assert_eq!(en_us.closeness_to(&requested[2]), None);
        assert_eq!(en_us.closeness_to(&requested[3]), None);

        let sr_latn = CultureCode::parse("sr-Latn-RS").unwrap();
        let sr_latn_me = CultureCode::parse("sr-Latn-ME").unwrap();
        assert_eq!(sr_latn.closeness_to(&sr_latn_me), Some(Closeness::SameScript));
        assert!(Closeness::SameRegion > Closeness::SameScript);
    }

    #[test]
    fn test_negotiate_in_preference_order() {
        let available = catalogue();

        let best = negotiate_culture(&codes(&["it-CH", "de"]), &available).unwrap();
        assert_eq!(best.code, "it-IT");

        let best = negotiate_culture(&codes(&["ja", "de-AT"]), &available).unwrap();
        assert_eq!(best.code, "de-DE");

        assert!(negotiate_culture(&codes(&["ja", "ko"]), &available).is_none());
    }

    #[test]
    fn test_negotiate_prefers_closest_then_catalogue_order() {
        let available = catalogue();

        let best = negotiate_culture(&codes(&["en-GB"]), &available).unwrap();
        assert_eq!(best.code, "en-GB");

        let best = negotiate_culture(&codes(&["en-AU"]), &available).unwrap();
        assert_eq!(best.code, "en-US");
    }
}
