//! Shape validation of raw date text.
//!
//! Shape checks only look at digit counts and separators; whether the digits
//! form a real date is the parser's concern, and whether a value is present at
//! all is [`required_error`]'s.

use crate::{FieldError, FormatPattern, PatternToken};
use parking_lot::RwLock;
use regex::Regex;
use std::collections::HashMap;

/// How raw text relates to a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStatus {
    /// Nothing typed
    Empty,
    /// A prefix of something that could still match
    Partial,
    /// Full match
    Complete,
    /// Can no longer match, whatever is typed next
    Mismatch,
}

/// Checks raw text against a pattern's shape.
#[derive(Debug, Default)]
pub struct FormatValidator {
    compiled: RwLock<HashMap<FormatPattern, Regex>>,
}

impl FormatValidator {
    /// Create a validator with an empty regex cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `raw` has the full shape of `pattern`.
    ///
    /// Each field accepts 1 to N digits (N = token length), literals must
    /// appear verbatim. The empty string always matches.
    pub fn matches_shape(&self, raw: &str, pattern: &FormatPattern) -> bool {
        if raw.is_empty() {
            return true;
        }
        if let Some(regex) = self.compiled.read().get(pattern) {
            return regex.is_match(raw);
        }

        let regex = shape_regex(pattern);
        let matched = regex.is_match(raw);
        self.compiled.write().insert(pattern.clone(), regex);
        matched
    }

    /// Classify `raw` as empty, a viable prefix, a full match or a mismatch.
    pub fn classify(&self, raw: &str, pattern: &FormatPattern) -> ShapeStatus {
        if raw.is_empty() {
            ShapeStatus::Empty
        } else if self.matches_shape(raw, pattern) {
            ShapeStatus::Complete
        } else if is_viable_prefix(raw, pattern) {
            ShapeStatus::Partial
        } else {
            ShapeStatus::Mismatch
        }
    }
}

/// Anchored regex for a pattern, e.g. `^\d{1,2}/\d{1,2}/\d{1,4}$`.
pub fn shape_regex(pattern: &FormatPattern) -> Regex {
    let body: String = pattern
        .tokens()
        .iter()
        .map(|t| match t {
            PatternToken::Field(f) => format!(r"\d{{1,{}}}", f.width()),
            PatternToken::Literal(s) => regex::escape(s),
        })
        .collect();
    // Built only from escaped literals and fixed quantifiers
    Regex::new(&format!("^{body}$")).expect("shape regex is always valid")
}

/// Whether more typing could turn `raw` into a full match.
fn is_viable_prefix(raw: &str, pattern: &FormatPattern) -> bool {
    let mut input = raw.chars().peekable();

    for token in pattern.tokens() {
        if input.peek().is_none() {
            return true;
        }
        match token {
            PatternToken::Field(field) => {
                let mut digits = 0;
                while digits < field.width() && input.next_if(char::is_ascii_digit).is_some() {
                    digits += 1;
                }
                if digits == 0 {
                    return false;
                }
            }
            PatternToken::Literal(literal) => {
                for expected in literal.chars() {
                    match input.next() {
                        Some(c) if c == expected => {}
                        Some(_) => return false,
                        None => return true,
                    }
                }
            }
        }
    }

    input.peek().is_none()
}

/// Presence check, kept separate from shape validation.
pub fn required_error(value: Option<&str>) -> Option<FieldError> {
    match value {
        Some(v) if !v.trim().is_empty() => None,
        _ => Some(FieldError::new("required", "validation.required")),
    }
}
