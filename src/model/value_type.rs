use crate::Result;
use core::str::FromStr;
use ohno::app_err;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// The closed set of scalar types a fact or metric can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter, IntoStaticStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    String,
    Bool,
}

impl ValueType {
    /// Parse the canonical lowercase name used in rule files.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or unrecognized name.
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(app_err!("empty value type name"));
        }

        Self::from_str(name).map_err(|_parse_err| app_err!("unknown value type '{name}' (expected one of int, float, string, bool)"))
    }

    /// Canonical lowercase name, as written in rule files.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Column holding values of this type in the analytical store's metrics table.
    #[must_use]
    pub const fn storage_column(self) -> &'static str {
        match self {
            Self::Int => "int_value",
            Self::Float => "float_value",
            Self::String => "string_value",
            Self::Bool => "bool_value",
        }
    }

    /// SQL type used when declaring columns of this type.
    #[must_use]
    pub const fn sql_type(self) -> &'static str {
        match self {
            Self::Int => "BIGINT",
            Self::Float => "DOUBLE",
            Self::String => "VARCHAR",
            Self::Bool => "BOOLEAN",
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_parse_canonical_names() {
        assert_eq!(ValueType::parse("int").unwrap(), ValueType::Int);
        assert_eq!(ValueType::parse("float").unwrap(), ValueType::Float);
        assert_eq!(ValueType::parse("string").unwrap(), ValueType::String);
        assert_eq!(ValueType::parse("bool").unwrap(), ValueType::Bool);
    }

    #[test]
    fn test_parse_rejects_unknown_and_empty() {
        let err = ValueType::parse("integer").unwrap_err();
        assert!(err.to_string().contains("unknown value type 'integer'"));

        let err = ValueType::parse("").unwrap_err();
        assert!(err.to_string().contains("empty value type"));
    }

    #[test]
    fn test_name_round_trips() {
        for value_type in ValueType::iter() {
            assert_eq!(ValueType::parse(value_type.name()).unwrap(), value_type);
            assert_eq!(value_type.to_string(), value_type.name());
        }
    }

    #[test]
    fn test_storage_columns() {
        assert_eq!(ValueType::Int.storage_column(), "int_value");
        assert_eq!(ValueType::Float.storage_column(), "float_value");
        assert_eq!(ValueType::String.storage_column(), "string_value");
        assert_eq!(ValueType::Bool.storage_column(), "bool_value");
    }
}
