//! Scalar setting values
//!
//! Settings are flat scalars: a number, a piece of text or a flag. Other JSON
//! values (null, arrays, nested objects) have no `SettingValue` form and are
//! dropped when a document is parsed.

use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;

/// A single setting value stored under `module.key`
///
/// Numbers keep their JSON representation, so an integer read from disk is
/// written back as an integer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Flag(bool),
    Number(Number),
    Text(String),
}

impl SettingValue {
    /// Convert a parsed JSON value; non-scalars are handed back unchanged
    pub fn from_json(value: Value) -> Result<Self, Value> {
        match value {
            Value::Bool(b) => Ok(SettingValue::Flag(b)),
            Value::Number(n) => Ok(SettingValue::Number(n)),
            Value::String(s) => Ok(SettingValue::Text(s)),
            other => Err(other),
        }
    }

    /// Best-effort conversion of a raw replacement value
    ///
    /// Text that parses as a finite floating-point number becomes `Number`,
    /// everything else is kept verbatim as `Text`.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().parse::<f64>().ok().and_then(Number::from_f64) {
            Some(number) => SettingValue::Number(number),
            None => SettingValue::Text(raw.to_string()),
        }
    }

    /// Numeric view of the value
    ///
    /// `Text` holding a number qualifies, and a flag reads as `1.0` / `0.0`.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            SettingValue::Number(n) => n.as_f64(),
            SettingValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            SettingValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
        }
    }

    /// Name of the variant, used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Flag(_) => "flag",
            SettingValue::Number(_) => "number",
            SettingValue::Text(_) => "text",
        }
    }
}

/// Name of a JSON value's type, for reporting dropped entries
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "flag",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Flag(b) => write!(f, "{}", b),
            SettingValue::Number(n) => write!(f, "{}", n),
            SettingValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for SettingValue {
    /// Non-finite numbers have no JSON form and are kept as text
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(number) => SettingValue::Number(number),
            None => SettingValue::Text(value.to_string()),
        }
    }
}

impl From<u32> for SettingValue {
    fn from(value: u32) -> Self {
        SettingValue::Number(Number::from(value))
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        SettingValue::Number(Number::from(value))
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Flag(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_numeric_text() {
        assert_eq!(SettingValue::coerce("3.5"), SettingValue::from(3.5));
        assert_eq!(SettingValue::coerce("42"), SettingValue::from(42.0));
        assert_eq!(SettingValue::coerce(" 1e3 "), SettingValue::from(1000.0));
        assert_eq!(SettingValue::coerce("-0.25"), SettingValue::from(-0.25));
    }

    #[test]
    fn test_coerce_falls_back_to_text() {
        assert_eq!(
            SettingValue::coerce("abc"),
            SettingValue::Text("abc".to_string())
        );
        assert_eq!(
            SettingValue::coerce("Per-monitor"),
            SettingValue::Text("Per-monitor".to_string())
        );
        // Non-finite numbers cannot be written as JSON
        assert_eq!(
            SettingValue::coerce("inf"),
            SettingValue::Text("inf".to_string())
        );
        assert_eq!(
            SettingValue::coerce("NaN"),
            SettingValue::Text("NaN".to_string())
        );
    }

    #[test]
    fn test_json_mapping() {
        assert_eq!(SettingValue::from_json(json!(true)), Ok(SettingValue::Flag(true)));
        assert_eq!(SettingValue::from_json(json!(1.25)), Ok(SettingValue::from(1.25)));
        assert_eq!(SettingValue::from_json(json!(800)), Ok(SettingValue::from(800u32)));
        assert_eq!(
            SettingValue::from_json(json!("System")),
            Ok(SettingValue::from("System"))
        );

        assert_eq!(SettingValue::from_json(Value::Null), Err(Value::Null));
        assert_eq!(SettingValue::from_json(json!([1])), Err(json!([1])));
        assert_eq!(json_kind(&json!({"a": 1})), "object");
        assert_eq!(json_kind(&json!([1])), "array");
    }

    #[test]
    fn test_integers_stay_integers() {
        assert_eq!(serde_json::to_string(&SettingValue::from(800u32)).unwrap(), "800");
        assert_eq!(serde_json::to_string(&SettingValue::from(-3i32)).unwrap(), "-3");
        assert_eq!(serde_json::to_string(&SettingValue::from(1.0)).unwrap(), "1.0");
        assert_ne!(SettingValue::from(800u32), SettingValue::from(800.0));
        assert_eq!(SettingValue::from(f64::INFINITY), SettingValue::from("inf"));
    }

    #[test]
    fn test_numeric_views() {
        assert_eq!(SettingValue::from(2.0).to_f64(), Some(2.0));
        assert_eq!(SettingValue::from(600u32).to_f64(), Some(600.0));
        assert_eq!(SettingValue::from("1.5").to_f64(), Some(1.5));
        assert_eq!(SettingValue::from("wide").to_f64(), None);
        assert_eq!(SettingValue::Flag(true).to_f64(), Some(1.0));
        assert_eq!(SettingValue::Flag(false).to_f64(), Some(0.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(SettingValue::from(1.25).to_string(), "1.25");
        assert_eq!(SettingValue::from(800u32).to_string(), "800");
        assert_eq!(SettingValue::Flag(false).to_string(), "false");
        assert_eq!(SettingValue::from("System").to_string(), "System");
    }
}
