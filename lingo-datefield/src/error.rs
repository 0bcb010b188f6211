//! Error types for date field operations

use thiserror::Error;

/// Errors raised by the date engine.
///
/// Malformed user input never produces one of these; it yields `Ok(None)`
/// from the parser or a [`FieldError`](crate::FieldError) on the form control.
#[derive(Debug, Error)]
pub enum DateFieldError {
    /// Culture code that cannot be parsed or has no locale data
    #[error("Unknown culture: {0}")]
    UnknownCulture(String),

    /// Token sequence without exactly one year, month and day field
    #[error("Invalid date pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Locale data did not yield a year/month/day pattern
    #[error("Cannot derive a date pattern for {culture}: {reason}")]
    PatternUnavailable { culture: String, reason: String },

    /// The locale formatter failed
    #[error("Formatter error: {0}")]
    Formatter(String),

    /// Text is not a `YYYY-MM-DD` calendar date
    #[error("Invalid canonical date: {0}")]
    InvalidCanonical(String),
}
