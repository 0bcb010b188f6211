//! Date format patterns.
//!
//! A [`FormatPattern`] is the ordered sequence of field tokens (`yyyy`, `mm`,
//! `dd`) and literal separators describing how a locale writes a numeric date,
//! e.g. `mm/dd/yyyy` or `dd.mm.yyyy`.

use crate::DateFieldError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateField {
    Year,
    Month,
    Day,
}

impl DateField {
    /// Token text for this field.
    pub fn token(&self) -> &'static str {
        match self {
            DateField::Year => "yyyy",
            DateField::Month => "mm",
            DateField::Day => "dd",
        }
    }

    /// Maximum digits a user may type for this field.
    pub fn width(&self) -> usize {
        self.token().len()
    }
}

/// One element of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternToken {
    Field(DateField),
    Literal(String),
}

/// Ordered field/separator sequence for one locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatPattern {
    tokens: Vec<PatternToken>,
}

impl FormatPattern {
    /// Build from tokens. Each field must appear exactly once.
    pub fn new(tokens: Vec<PatternToken>) -> Result<Self, DateFieldError> {
        for field in [DateField::Year, DateField::Month, DateField::Day] {
            let count = tokens
                .iter()
                .filter(|t| **t == PatternToken::Field(field))
                .count();
            if count != 1 {
                return Err(DateFieldError::InvalidPattern {
                    pattern: render(&tokens),
                    reason: format!("expected exactly one {} field, found {}", field.token(), count),
                });
            }
        }
        Ok(Self { tokens })
    }

    /// The locale-independent `yyyy-mm-dd` pattern.
    pub fn iso() -> Self {
        Self {
            tokens: vec![
                PatternToken::Field(DateField::Year),
                PatternToken::Literal("-".to_string()),
                PatternToken::Field(DateField::Month),
                PatternToken::Literal("-".to_string()),
                PatternToken::Field(DateField::Day),
            ],
        }
    }

    /// Tokens in order.
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Field order, e.g. `[Month, Day, Year]` for `mm/dd/yyyy`.
    pub fn field_order(&self) -> [DateField; 3] {
        let mut order = [DateField::Year, DateField::Month, DateField::Day];
        for (slot, field) in order.iter_mut().zip(self.fields()) {
            *slot = field;
        }
        order
    }

    fn fields(&self) -> impl Iterator<Item = DateField> + '_ {
        self.tokens.iter().filter_map(|t| match t {
            PatternToken::Field(f) => Some(*f),
            PatternToken::Literal(_) => None,
        })
    }

    /// First separator between two fields, if any.
    pub fn separator(&self) -> Option<&str> {
        let first_field = self
            .tokens
            .iter()
            .position(|t| matches!(t, PatternToken::Field(_)))?;
        self.tokens[first_field..].iter().find_map(|t| match t {
            PatternToken::Literal(s) => Some(s.as_str()),
            PatternToken::Field(_) => None,
        })
    }

    /// Render a date in this pattern: 4-digit year, zero-padded month and day.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use lingo_datefield::FormatPattern;
    ///
    /// let pattern: FormatPattern = "dd/mm/yyyy".parse().unwrap();
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    /// assert_eq!(pattern.format(date), "05/03/2024");
    /// ```
    pub fn format(&self, date: NaiveDate) -> String {
        self.tokens
            .iter()
            .map(|t| match t {
                PatternToken::Field(DateField::Year) => format!("{:04}", date.year()),
                PatternToken::Field(DateField::Month) => format!("{:02}", date.month()),
                PatternToken::Field(DateField::Day) => format!("{:02}", date.day()),
                PatternToken::Literal(s) => s.clone(),
            })
            .collect()
    }

    /// Input hint, identical to the textual pattern (`mm/dd/yyyy`).
    pub fn placeholder(&self) -> String {
        self.to_string()
    }
}

fn render(tokens: &[PatternToken]) -> String {
    tokens
        .iter()
        .map(|t| match t {
            PatternToken::Field(f) => f.token(),
            PatternToken::Literal(s) => s.as_str(),
        })
        .collect()
}

impl fmt::Display for FormatPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.tokens))
    }
}

impl FromStr for FormatPattern {
    type Err = DateFieldError;

    /// Parse textual patterns such as `dd.mm.yyyy`. Text between tokens is
    /// kept as literal separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut rest = s;

        while !rest.is_empty() {
            let field = [DateField::Year, DateField::Month, DateField::Day]
                .into_iter()
                .find(|f| rest.starts_with(f.token()));

            match field {
                Some(field) => {
                    if !literal.is_empty() {
                        tokens.push(PatternToken::Literal(std::mem::take(&mut literal)));
                    }
                    tokens.push(PatternToken::Field(field));
                    rest = &rest[field.token().len()..];
                }
                None => {
                    let mut chars = rest.chars();
                    if let Some(c) = chars.next() {
                        literal.push(c);
                    }
                    rest = chars.as_str();
                }
            }
        }
        if !literal.is_empty() {
            tokens.push(PatternToken::Literal(literal));
        }

        Self::new(tokens)
    }
}
