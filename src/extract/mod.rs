//! Strategies that turn one artifact's bytes into typed values.
//!
//! Every strategy is a variant of the closed [`Extractor`] enum. Extraction either
//! succeeds with one or more [`Value`]s or fails with an [`ExtractError`], which
//! separates content that merely doesn't satisfy the rule
//! ([`ExtractError::ParseFailure`]) from failures that must stop the load
//! ([`ExtractError::Fatal`]).

mod command;
mod json_path;
mod key_value;
mod pattern;
mod presence;

pub use command::CommandExtractor;
pub use json_path::JsonPathExtractor;
pub use key_value::KeyValueExtractor;
pub use pattern::PatternExtractor;
pub use presence::PresenceExtractor;

use crate::model::{Artifact, Value, ValueType};
use core::fmt;
use ohno::AppError;

/// Outcome of a failed extraction.
#[derive(Debug)]
pub enum ExtractError {
    /// The artifact's content does not satisfy the rule.
    ParseFailure(String),

    /// Anything else, such as an unreadable artifact or a command that can't be spawned.
    Fatal(AppError),
}

impl ExtractError {
    pub(crate) fn parse_failure(message: impl Into<String>) -> Self {
        Self::ParseFailure(message.into())
    }

    #[must_use]
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseFailure(_))
    }
}

impl From<AppError> for ExtractError {
    fn from(e: AppError) -> Self {
        Self::Fatal(e)
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseFailure(message) => write!(f, "parse failure: {message}"),
            Self::Fatal(e) => write!(f, "{e}"),
        }
    }
}

/// Convert raw text into a value, treating a conversion error as a parse failure.
fn convert(raw: &str, value_type: ValueType) -> Result<Value, ExtractError> {
    Value::parse(raw, value_type).map_err(|e| ExtractError::parse_failure(e.to_string()))
}

#[derive(Debug)]
pub enum Extractor {
    Pattern(PatternExtractor),
    JsonPath(JsonPathExtractor),
    KeyValue(KeyValueExtractor),
    Command(CommandExtractor),
    Presence(PresenceExtractor),
}

impl Extractor {
    /// Extract values of type `value_type` from the artifact.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::ParseFailure`] when the content doesn't satisfy the
    /// extractor and [`ExtractError::Fatal`] for everything else.
    pub fn extract(&self, artifact: &Artifact, value_type: ValueType) -> Result<Vec<Value>, ExtractError> {
        match self {
            Self::Pattern(e) => e.extract(artifact, value_type).map(|v| vec![v]),
            Self::JsonPath(e) => e.extract(artifact, value_type),
            Self::KeyValue(e) => e.extract(artifact, value_type).map(|v| vec![v]),
            Self::Command(e) => e.extract(artifact, value_type).map(|v| vec![v]),
            Self::Presence(e) => Ok(vec![e.value().clone()]),
        }
    }
}

impl fmt::Display for Extractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "pattern {}", e.pattern()),
            Self::JsonPath(e) => write!(f, "jsonpath {}", e.expression()),
            Self::KeyValue(e) => write!(f, "variable {}", e.key()),
            Self::Command(e) => write!(f, "command {}", e.args().join(" ")),
            Self::Presence(e) => write!(f, "presence -> {}", e.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohno::app_err;

    #[test]
    fn test_dispatch_wraps_single_values() {
        let artifact = Artifact::with_content("a.txt", "/unused", b"17".to_vec());
        let extractor = Extractor::Pattern(PatternExtractor::new(".+").unwrap());
        assert_eq!(extractor.extract(&artifact, ValueType::Int).unwrap(), vec![Value::Int(17)]);
    }

    #[test]
    fn test_presence_ignores_content() {
        let artifact = Artifact::new("trace.dat", "/nonexistent/trace.dat");
        let extractor = Extractor::Presence(PresenceExtractor::new(Value::Bool(true)));
        assert_eq!(extractor.extract(&artifact, ValueType::Bool).unwrap(), vec![Value::Bool(true)]);
    }

    #[test]
    fn test_error_categories() {
        let soft = ExtractError::parse_failure("no match");
        assert!(soft.is_parse_failure());
        assert_eq!(soft.to_string(), "parse failure: no match");

        let hard = ExtractError::from(app_err!("disk on fire"));
        assert!(!hard.is_parse_failure());
        assert!(hard.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_conversion_errors_are_soft() {
        let err = convert("abc", ValueType::Int).unwrap_err();
        assert!(err.is_parse_failure());
        assert_eq!(convert("abc", ValueType::String).unwrap(), Value::String("abc".to_string()));
    }
}
