//! Dynamically typed scalar values.
//!
//! [`Value`] is what flows into `Query::value`, placeholder templates, statement
//! bindings and fetched rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar SQL value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret this value as a number the lenient way: numbers are taken as-is,
    /// text contributes its leading numeric prefix (`"3.5kg"` -> `3.5`).
    ///
    /// Returns `None` for NULL, booleans, non-finite floats and text without a
    /// numeric prefix.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            Value::Text(s) => parse_number_prefix(s),
            _ => None,
        }
    }

    /// Render this value as a bare SQL numeral, using the same leniency as
    /// [`Value::as_number`].
    ///
    /// Integers (and integral text prefixes that fit in an `i64`) are emitted
    /// digit for digit, never through `f64`.
    pub fn to_numeral(&self) -> Option<String> {
        match self {
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if f.is_finite() => Some(format_number(*f)),
            Value::Text(s) => {
                let prefix = number_prefix(s)?;
                match prefix.parse::<i64>() {
                    Ok(i) => Some(i.to_string()),
                    Err(_) => prefix
                        .parse::<f64>()
                        .ok()
                        .filter(|n| n.is_finite())
                        .map(format_number),
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&format_number(*x)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Render a number as a bare SQL numeral: integral values drop the fraction
/// (`3.0` -> `3`), everything else uses the shortest round-trip form.
pub(crate) fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Parse the longest numeric prefix of `s` (after leading whitespace).
pub(crate) fn parse_number_prefix(s: &str) -> Option<f64> {
    number_prefix(s)?.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// The longest numeric prefix of `s` (after leading whitespace).
///
/// Accepts an optional sign, digits with an optional fraction, and an optional
/// exponent that is only consumed when followed by digits.
fn number_prefix(s: &str) -> Option<&str> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    Some(&s[..end])
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<&Value> for Value {
    fn from(v: &Value) -> Self {
        v.clone()
    }
}

/// JSON scalars map onto the matching variant; arrays and objects become their
/// JSON text.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_prefix_parsing() {
        assert_eq!(parse_number_prefix("3.5"), Some(3.5));
        assert_eq!(parse_number_prefix("  42abc"), Some(42.0));
        assert_eq!(parse_number_prefix("-7"), Some(-7.0));
        assert_eq!(parse_number_prefix(".5"), Some(0.5));
        assert_eq!(parse_number_prefix("5."), Some(5.0));
        assert_eq!(parse_number_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_number_prefix("2e"), Some(2.0));
        assert_eq!(parse_number_prefix("abc"), None);
        assert_eq!(parse_number_prefix("-"), None);
        assert_eq!(parse_number_prefix(""), None);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn lenient_numbers() {
        assert_eq!(Value::from("12px").as_number(), Some(12.0));
        assert_eq!(Value::Int(4).as_number(), Some(4.0));
        assert_eq!(Value::Null.as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
    }

    #[test]
    fn numerals_keep_integer_precision() {
        assert_eq!(
            Value::Int(1_234_567_890_123_456_789).to_numeral().as_deref(),
            Some("1234567890123456789")
        );
        assert_eq!(
            Value::Int(i64::MAX).to_numeral().as_deref(),
            Some("9223372036854775807")
        );
        assert_eq!(
            Value::from("1234567890123456789").to_numeral().as_deref(),
            Some("1234567890123456789")
        );
        assert_eq!(Value::from(" -42abc").to_numeral().as_deref(), Some("-42"));
        assert_eq!(Value::from("+7").to_numeral().as_deref(), Some("7"));
        assert_eq!(Value::from("3.5kg").to_numeral().as_deref(), Some("3.5"));
        assert_eq!(Value::from("5.").to_numeral().as_deref(), Some("5"));
        assert_eq!(Value::from("1e3").to_numeral().as_deref(), Some("1000"));
        assert_eq!(Value::from("abc").to_numeral(), None);
        assert_eq!(Value::Null.to_numeral(), None);
    }

    #[test]
    fn option_and_json_conversions() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
        assert_eq!(Value::from(serde_json::json!(7)), Value::Int(7));
        assert_eq!(Value::from(serde_json::json!(1.25)), Value::Float(1.25));
        assert_eq!(
            Value::from(serde_json::json!([1, 2])),
            Value::Text("[1,2]".into())
        );
    }

    #[test]
    fn serializes_untagged() {
        let row = vec![Value::Int(1), Value::Null, Value::from("a")];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[1,null,"a"]"#);
    }
}
