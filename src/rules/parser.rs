use super::{ParserTarget, TargetKind};
use crate::Result;
use crate::extract::{ExtractError, Extractor};
use crate::model::{Artifact, Metric, Value};
use ohno::{IntoAppError, app_err};
use regex::Regex;

/// What one rule contributed from one artifact.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutput {
    /// The artifact's name didn't match the rule's filter.
    Skipped,
    Fact { name: String, value: Value },
    Metrics(Vec<Metric>),
}

/// A named extraction rule: an artifact name filter, a target, and an extractor.
#[derive(Debug)]
pub struct Parser {
    name: String,
    artifact_filter: Regex,
    target: ParserTarget,
    extractor: Extractor,
}

impl Parser {
    /// # Errors
    ///
    /// Returns an error if the artifact name filter doesn't compile.
    pub fn new(name: impl Into<String>, artifact_pattern: &str, target: ParserTarget, extractor: Extractor) -> Result<Self> {
        let artifact_filter =
            Regex::new(artifact_pattern).into_app_err_with(|| format!("compiling artifact name pattern '{artifact_pattern}'"))?;

        Ok(Self {
            name: name.into(),
            artifact_filter,
            target,
            extractor,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn target(&self) -> &ParserTarget {
        &self.target
    }

    #[must_use]
    pub const fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    #[must_use]
    pub fn applies_to(&self, artifact: &Artifact) -> bool {
        self.artifact_filter.is_match(artifact.name())
    }

    /// Run the rule against one artifact.
    ///
    /// # Errors
    ///
    /// Propagates the extractor's failure. A fact rule that extracts more than one
    /// value fails with [`ExtractError::Fatal`].
    pub fn parse(&self, artifact: &Artifact) -> Result<ParseOutput, ExtractError> {
        if !self.applies_to(artifact) {
            return Ok(ParseOutput::Skipped);
        }

        let mut values = self.extractor.extract(artifact, self.target.value_type)?;

        match self.target.kind {
            TargetKind::Metric => Ok(ParseOutput::Metrics(
                values
                    .into_iter()
                    .map(|value| Metric {
                        name: self.target.name.clone(),
                        value,
                        unit: self.target.unit,
                    })
                    .collect(),
            )),
            TargetKind::Fact => match values.len() {
                0 => Ok(ParseOutput::Skipped),
                1 => Ok(ParseOutput::Fact {
                    name: self.target.name.clone(),
                    value: values.swap_remove(0),
                }),
                n => Err(ExtractError::Fatal(app_err!(
                    "rule '{}' extracted {n} values from artifact '{}' for fact '{}', a fact holds a single value",
                    self.name,
                    artifact.name(),
                    self.target.name
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{JsonPathExtractor, PatternExtractor, PresenceExtractor};
    use crate::model::ValueType;

    fn json_artifact(name: &str) -> Artifact {
        Artifact::with_content(name, "/unused", br#"{"samples": [1, 2, 3], "host": "box"}"#.to_vec())
    }

    #[test]
    fn test_filter_mismatch_is_skipped() {
        let parser = Parser::new(
            "trace",
            r"^trace\.dat$",
            ParserTarget::fact("traced".to_string(), ValueType::Bool),
            Extractor::Presence(PresenceExtractor::new(Value::Bool(true))),
        )
        .unwrap();

        assert_eq!(parser.parse(&json_artifact("out.json")).unwrap(), ParseOutput::Skipped);
        assert_eq!(
            parser.parse(&json_artifact("trace.dat")).unwrap(),
            ParseOutput::Fact {
                name: "traced".to_string(),
                value: Value::Bool(true)
            }
        );
    }

    #[test]
    fn test_metric_accepts_many_values() {
        let parser = Parser::new(
            "samples",
            r"\.json$",
            ParserTarget::metric("lat".to_string(), ValueType::Int, None),
            Extractor::JsonPath(JsonPathExtractor::new("$.samples").unwrap()),
        )
        .unwrap();

        let ParseOutput::Metrics(metrics) = parser.parse(&json_artifact("out.json")).unwrap() else {
            panic!("expected metrics");
        };
        let values: Vec<_> = metrics.into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_fact_rejects_many_values() {
        let parser = Parser::new(
            "samples",
            r"\.json$",
            ParserTarget::fact("sample".to_string(), ValueType::Int),
            Extractor::JsonPath(JsonPathExtractor::new("$.samples").unwrap()),
        )
        .unwrap();

        let err = parser.parse(&json_artifact("out.json")).unwrap_err();
        assert!(matches!(err, ExtractError::Fatal(ref e) if e.to_string().contains("extracted 3 values")));
    }

    #[test]
    fn test_soft_failures_propagate() {
        let parser = Parser::new(
            "score",
            ".*",
            ParserTarget::metric("score".to_string(), ValueType::Int, None),
            Extractor::Pattern(PatternExtractor::new(r"score=(\d+)").unwrap()),
        )
        .unwrap();

        assert!(parser.parse(&json_artifact("out.json")).unwrap_err().is_parse_failure());
    }

    #[test]
    fn test_invalid_filter() {
        let _ = Parser::new(
            "bad",
            "(",
            ParserTarget::fact("f".to_string(), ValueType::Int),
            Extractor::Presence(PresenceExtractor::new(Value::Int(1))),
        )
        .unwrap_err();
    }
}
