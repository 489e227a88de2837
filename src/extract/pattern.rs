use super::{ExtractError, convert};
use crate::Result;
use crate::model::{Artifact, Value, ValueType};
use ohno::{IntoAppError, bail};
use regex::bytes::Regex;

/// Extracts a value with a regular expression applied to the whole artifact.
///
/// The pattern may contain at most one capturing group. With a group, the value
/// is taken from the captured text, otherwise from the whole match. Exactly one
/// match is required.
#[derive(Debug)]
pub struct PatternExtractor {
    re: Regex,
}

impl PatternExtractor {
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile or has more than one capturing group.
    pub fn new(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).into_app_err_with(|| format!("compiling regular expression '{pattern}'"))?;

        let groups = re.captures_len() - 1;
        if groups > 1 {
            bail!("regular expression '{pattern}' has {groups} capturing groups, at most one is allowed");
        }

        Ok(Self { re })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.re.as_str()
    }

    pub(super) fn extract(&self, artifact: &Artifact, value_type: ValueType) -> Result<Value, ExtractError> {
        let content = artifact.content()?;

        let mut matches = self.re.captures_iter(content);
        let Some(captures) = matches.next() else {
            return Err(ExtractError::parse_failure(format!(
                "no match for '{}' in artifact '{}'",
                self.re,
                artifact.name()
            )));
        };

        if matches.next().is_some() {
            return Err(ExtractError::parse_failure(format!(
                "ambiguous: multiple matches for '{}' in artifact '{}', only one is allowed",
                self.re,
                artifact.name()
            )));
        }

        let group = self.re.captures_len() - 1;
        let matched = captures.get(group).map_or(&b""[..], |m| m.as_bytes());
        let text = core::str::from_utf8(matched)
            .map_err(|e| ExtractError::parse_failure(format!("match in artifact '{}' is not valid UTF-8: {e}", artifact.name())))?;

        convert(text, value_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(content: &str) -> Artifact {
        Artifact::with_content("out.txt", "/unused", content.as_bytes().to_vec())
    }

    #[test]
    fn test_whole_match() {
        let extractor = PatternExtractor::new(".+").unwrap();
        assert_eq!(extractor.extract(&artifact("42"), ValueType::Int).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_capture_group() {
        let extractor = PatternExtractor::new(r"latency: (\d+\.\d+)ms").unwrap();
        let value = extractor
            .extract(&artifact("warmup done\nlatency: 12.5ms\n"), ValueType::Float)
            .unwrap();
        assert_eq!(value, Value::Float(12.5));
    }

    #[test]
    fn test_too_many_groups_is_rejected() {
        let err = PatternExtractor::new(r"(\d+) (\d+)").unwrap_err();
        assert!(err.to_string().contains("2 capturing groups"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let _ = PatternExtractor::new("(unclosed").unwrap_err();
    }

    #[test]
    fn test_no_match_is_soft() {
        let extractor = PatternExtractor::new(r"score=(\d+)").unwrap();
        let err = extractor.extract(&artifact("nothing here"), ValueType::Int).unwrap_err();
        assert!(matches!(err, ExtractError::ParseFailure(ref m) if m.contains("no match")));
    }

    #[test]
    fn test_multiple_matches_are_ambiguous() {
        let extractor = PatternExtractor::new(".+").unwrap();
        let err = extractor.extract(&artifact("1\n2\n"), ValueType::Int).unwrap_err();
        assert!(matches!(err, ExtractError::ParseFailure(ref m) if m.contains("ambiguous")));
    }

    #[test]
    fn test_conversion_failure_is_soft() {
        let extractor = PatternExtractor::new(".+").unwrap();
        let err = extractor.extract(&artifact("forty-two"), ValueType::Int).unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn test_unreadable_artifact_is_fatal() {
        let extractor = PatternExtractor::new(".+").unwrap();
        let missing = Artifact::new("gone", "/nonexistent/benchfacts/gone");
        let err = extractor.extract(&missing, ValueType::Int).unwrap_err();
        assert!(matches!(err, ExtractError::Fatal(_)));
    }
}
