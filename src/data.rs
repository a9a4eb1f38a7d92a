//! Scalar cell values and their canonical forms.
//!
//! Every cell loaded from a CSV export or workbook sheet becomes an optional
//! [`Value`]; `None` is the null marker. Two renderings exist:
//!
//! - [`Value::as_display`] is what gets written back to CSV and keeps the
//!   loaded representation (`2000.0` stays `2000.0`).
//! - [`Value::canonical`] is what the comparator looks at: trimmed, with
//!   numbers (and number-looking text) normalized so `2000.0` equals `2000`.
//!
//! [`Value::key`] sits in between and is used for match keys, which must not
//! be trimmed but still treat `163125` and `163125.0` as the same identifier.

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cell contents treated as null on load.
pub const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest magnitude rendered as an integer when converting workbook floats.
const INTEGRAL_FLOAT_LIMIT: f64 = 1e15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Boolean(true) => "True".to_string(),
            Value::Boolean(false) => "False".to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }

    /// Comparison form: trimmed, numerics normalized.
    pub fn canonical(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Decimal(d) => canonical_decimal(*d),
            Value::Boolean(b) => canonical_boolean(*b),
            Value::Text(s) => {
                let trimmed = s.trim();
                if let Some(d) = parse_decimal(trimmed) {
                    canonical_decimal(d)
                } else if let Some(b) = parse_boolean(trimmed) {
                    canonical_boolean(b)
                } else {
                    trimmed.to_string()
                }
            }
            Value::DateTime(_) => self.as_display(),
        }
    }

    /// Match-key form: numerics (typed or spelled as text) normalized, text
    /// otherwise left untouched.
    pub fn key(&self) -> String {
        match self {
            Value::Integer(_) | Value::Decimal(_) => self.canonical(),
            Value::Text(s) => match parse_decimal(s) {
                Some(d) => canonical_decimal(d),
                None => s.clone(),
            },
            other => other.as_display(),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Decimal(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

pub fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw)
}

/// Types a raw CSV field. Null tokens yield `None`.
pub fn parse_cell(raw: &str) -> Option<Value> {
    if is_null_token(raw) {
        return None;
    }
    if let Ok(parsed) = raw.parse::<i64>() {
        return Some(Value::Integer(parsed));
    }
    if let Some(parsed) = parse_decimal(raw) {
        return Some(Value::Decimal(parsed));
    }
    Some(match parse_boolean(raw) {
        Some(b) => Value::Boolean(b),
        None => Value::Text(raw.to_string()),
    })
}

/// Converts a spreadsheet float, collapsing integral values to integers.
pub fn value_from_float(value: f64) -> Option<Value> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < INTEGRAL_FLOAT_LIMIT {
        return Some(Value::Integer(value as i64));
    }
    let rendered = value.to_string();
    Some(match parse_decimal(&rendered) {
        Some(decimal) => Value::Decimal(decimal),
        None => Value::Text(rendered),
    })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    // Decimal::from_str tolerates '_' separators; plain numerals only here.
    let plain = !raw.is_empty()
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+'))
        && raw.bytes().any(|b| b.is_ascii_digit());
    if !plain {
        return None;
    }
    Decimal::from_str(raw).ok()
}

fn parse_boolean(raw: &str) -> Option<bool> {
    match raw {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn canonical_boolean(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}

fn canonical_decimal(value: Decimal) -> String {
    let normalized = value.normalize();
    if normalized.is_zero() {
        "0".to_string()
    } else {
        normalized.to_string()
    }
}
