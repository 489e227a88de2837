use super::ValueType;
use crate::Result;
use core::cmp::Ordering;
use core::fmt;
use ohno::app_err;
use serde::{Serialize, Serializer};

/// A typed scalar extracted from an artifact.
///
/// The variant is fixed at construction. The `*_value` accessors never fail:
/// asking for the wrong variant yields that type's zero value. Code that needs
/// to detect a mismatch should match on the enum or use [`Value::to_f64`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl Value {
    /// Convert a raw string into a value of the requested type.
    ///
    /// Booleans accept `true`/`false`, `t`/`f` and `1`/`0`, ignoring case.
    /// Integers must be base 10. Floats accept any real literal, integers included.
    /// Strings are copied as-is.
    ///
    /// # Errors
    ///
    /// Returns a conversion error when `raw` is not a valid literal for `value_type`.
    pub fn parse(raw: &str, value_type: ValueType) -> Result<Self> {
        match value_type {
            ValueType::Int => raw
                .parse::<i64>()
                .map(Self::Int)
                .map_err(|e| app_err!("unable to convert '{raw}' to int: {e}")),
            ValueType::Float => raw
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|e| app_err!("unable to convert '{raw}' to float: {e}")),
            ValueType::String => Ok(Self::String(raw.to_string())),
            ValueType::Bool => parse_bool(raw).map(Self::Bool),
        }
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Int(_) => ValueType::Int,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Bool(_) => ValueType::Bool,
        }
    }

    #[must_use]
    pub const fn int_value(&self) -> i64 {
        match self {
            Self::Int(v) => *v,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn float_value(&self) -> f64 {
        match self {
            Self::Float(v) => *v,
            _ => 0.0,
        }
    }

    #[must_use]
    pub fn string_value(&self) -> &str {
        match self {
            Self::String(v) => v,
            _ => "",
        }
    }

    #[must_use]
    pub const fn bool_value(&self) -> bool {
        match self {
            Self::Bool(v) => *v,
            _ => false,
        }
    }

    /// Numeric view of the value, `None` for strings and booleans.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "metric samples are aggregated as f64")]
    pub const fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::String(_) | Self::Bool(_) => None,
        }
    }

    /// Total order used to present groups: values of one type compare naturally,
    /// values of different types order by type.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => self.value_type().cmp(&other.value_type()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::Bool(v) => serializer.serialize_bool(*v),
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Ok(true),
        "false" | "f" | "0" => Ok(false),
        _ => Err(app_err!("unable to convert '{raw}' to bool: expected true/false, t/f or 1/0")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(Value::parse("42", ValueType::Int).unwrap(), Value::Int(42));
        assert_eq!(Value::parse("-7", ValueType::Int).unwrap(), Value::Int(-7));
        let _ = Value::parse("4.2", ValueType::Int).unwrap_err();
        let _ = Value::parse("0x10", ValueType::Int).unwrap_err();
        let _ = Value::parse("", ValueType::Int).unwrap_err();
    }

    #[test]
    fn test_parse_float_accepts_integers() {
        assert_eq!(Value::parse("2.5", ValueType::Float).unwrap(), Value::Float(2.5));
        assert_eq!(Value::parse("3", ValueType::Float).unwrap(), Value::Float(3.0));
        assert_eq!(Value::parse("1e3", ValueType::Float).unwrap(), Value::Float(1000.0));
        let _ = Value::parse("fast", ValueType::Float).unwrap_err();
    }

    #[test]
    fn test_parse_string_is_verbatim() {
        assert_eq!(Value::parse("", ValueType::String).unwrap(), Value::String(String::new()));
        assert_eq!(
            Value::parse("  spaced out \n", ValueType::String).unwrap(),
            Value::String("  spaced out \n".to_string())
        );
    }

    #[test]
    fn test_parse_bool_is_permissive() {
        assert_eq!(Value::parse("TRUE", ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(Value::parse("True", ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(Value::parse("t", ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(Value::parse("1", ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(Value::parse("false", ValueType::Bool).unwrap(), Value::Bool(false));
        assert_eq!(Value::parse("F", ValueType::Bool).unwrap(), Value::Bool(false));
        assert_eq!(Value::parse("0", ValueType::Bool).unwrap(), Value::Bool(false));

        let err = Value::parse("notabool", ValueType::Bool).unwrap_err();
        assert!(err.to_string().contains("notabool"));
    }

    #[test]
    fn test_display_round_trips() {
        let samples = [
            Value::Int(i64::MIN),
            Value::Int(0),
            Value::Int(123_456),
            Value::Float(0.1),
            Value::Float(-2.0),
            Value::Float(6.022e23),
            Value::String("hello world".to_string()),
            Value::String(String::new()),
            Value::Bool(true),
            Value::Bool(false),
        ];

        for value in samples {
            let parsed = Value::parse(&value.to_string(), value.value_type()).unwrap();
            assert_eq!(parsed, value);
        }
    }

    #[test]
    fn test_accessors_degrade_to_zero_values() {
        let value = Value::String("abc".to_string());
        assert_eq!(value.int_value(), 0);
        assert!(value.float_value().abs() < f64::EPSILON);
        assert!(!value.bool_value());
        assert_eq!(value.string_value(), "abc");

        let value = Value::Int(5);
        assert_eq!(value.int_value(), 5);
        assert_eq!(value.string_value(), "");
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(Value::Int(3).to_f64(), Some(3.0));
        assert_eq!(Value::Float(1.5).to_f64(), Some(1.5));
        assert_eq!(Value::Bool(true).to_f64(), None);
        assert_eq!(Value::String("1".to_string()).to_f64(), None);
    }

    #[test]
    fn test_sort_cmp() {
        assert_eq!(Value::Int(2).sort_cmp(&Value::Int(10)), Ordering::Less);
        assert_eq!(Value::Float(2.5).sort_cmp(&Value::Float(2.5)), Ordering::Equal);
        assert_eq!(
            Value::String("b".to_string()).sort_cmp(&Value::String("a".to_string())),
            Ordering::Greater
        );
    }

    #[test]
    fn test_serialize_as_scalar() {
        assert_eq!(serde_json::to_string(&Value::Int(4)).unwrap(), "4");
        assert_eq!(serde_json::to_string(&Value::Float(0.5)).unwrap(), "0.5");
        assert_eq!(serde_json::to_string(&Value::String("x".to_string())).unwrap(), "\"x\"");
        assert_eq!(serde_json::to_string(&Value::Bool(false)).unwrap(), "false");
    }
}
