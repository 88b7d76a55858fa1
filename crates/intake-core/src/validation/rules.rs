//! Reglas atómicas aplicables a un campo.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::ValidationContext;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[0-9][0-9\s\-().]{5,18}[0-9]$").expect("phone regex"));

/// Regla de un campo. Las reglas de tipo (`String`, `Boolean`, `Number`,
/// `Date`, `Array`) cortan la evaluación del campo cuando fallan.
#[derive(Debug, Clone)]
pub enum Rule {
    String,
    Boolean,
    Number,
    Array,
    Date,
    MinLen(usize),
    MaxLen(usize),
    Email,
    Phone,
    Pattern(Regex),
    OneOf(Vec<String>),
    Range { min: Option<f64>, max: Option<f64> },
    MustBeTrue,
    NotBeforeToday,
    NotAfterToday,
    MinItems(usize),
}

impl Rule {
    pub(crate) fn is_type_check(&self) -> bool {
        matches!(self, Rule::String | Rule::Boolean | Rule::Number | Rule::Array | Rule::Date)
    }

    /// Evalúa la regla sobre un valor presente. `Err` lleva el mensaje por
    /// defecto.
    pub(crate) fn check(&self, value: &Value, ctx: &ValidationContext) -> Result<(), String> {
        match self {
            Rule::String => value.as_str().map(|_| ()).ok_or_else(|| "Must be text".to_string()),
            Rule::Boolean => value.as_bool().map(|_| ()).ok_or_else(|| "Must be yes or no".to_string()),
            Rule::Number => as_number(value).map(|_| ()).ok_or_else(|| "Must be a number".to_string()),
            Rule::Array => value.as_array().map(|_| ()).ok_or_else(|| "Must be a list".to_string()),
            Rule::Date => parse_date(value).map(|_| ()).ok_or_else(|| "Must be a valid date (YYYY-MM-DD)".to_string()),
            Rule::MinLen(min) => {
                let len = text_len(value);
                if len < *min {
                    Err(format!("Must be at least {min} characters"))
                } else {
                    Ok(())
                }
            }
            Rule::MaxLen(max) => {
                let len = text_len(value);
                if len > *max {
                    Err(format!("Must be at most {max} characters"))
                } else {
                    Ok(())
                }
            }
            Rule::Email => match value.as_str() {
                Some(s) if EMAIL_RE.is_match(s.trim()) => Ok(()),
                _ => Err("Invalid email address".to_string()),
            },
            Rule::Phone => match value.as_str() {
                Some(s) if PHONE_RE.is_match(s.trim()) => Ok(()),
                _ => Err("Invalid phone number".to_string()),
            },
            Rule::Pattern(re) => match value.as_str() {
                Some(s) if re.is_match(s) => Ok(()),
                _ => Err("Invalid format".to_string()),
            },
            Rule::OneOf(options) => match value.as_str() {
                Some(s) if options.iter().any(|o| o == s) => Ok(()),
                _ => Err(format!("Must be one of: {}", options.join(", "))),
            },
            Rule::Range { min, max } => {
                let n = as_number(value).ok_or_else(|| "Must be a number".to_string())?;
                if let Some(lo) = min {
                    if n < *lo {
                        return Err(format!("Must be at least {lo}"));
                    }
                }
                if let Some(hi) = max {
                    if n > *hi {
                        return Err(format!("Must be at most {hi}"));
                    }
                }
                Ok(())
            }
            Rule::MustBeTrue => match value.as_bool() {
                Some(true) => Ok(()),
                _ => Err("Must be accepted".to_string()),
            },
            Rule::NotBeforeToday => match parse_date(value) {
                Some(d) if d >= ctx.today => Ok(()),
                Some(_) => Err("Date cannot be in the past".to_string()),
                None => Err("Must be a valid date (YYYY-MM-DD)".to_string()),
            },
            Rule::NotAfterToday => match parse_date(value) {
                Some(d) if d <= ctx.today => Ok(()),
                Some(_) => Err("Date cannot be in the future".to_string()),
                None => Err("Must be a valid date (YYYY-MM-DD)".to_string()),
            },
            Rule::MinItems(min) => {
                let len = value.as_array().map(Vec::len).unwrap_or(0);
                if len < *min {
                    Err(format!("Select at least {min} item(s)"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Acepta `YYYY-MM-DD` o un timestamp RFC 3339 (se toma su fecha).
pub(crate) fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
                                            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn text_len(value: &Value) -> usize {
    match value {
        Value::String(s) => s.trim().chars().count(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}
