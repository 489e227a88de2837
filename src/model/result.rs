use super::{Artifact, Unit, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Names that identify a result structurally and so can never be used as fact names.
pub const RESERVED_FACT_NAMES: &[&str] = &["test_name", "result_id"];

#[must_use]
pub fn is_reserved_fact_name(name: &str) -> bool {
    RESERVED_FACT_NAMES.contains(&name)
}

/// One sample of a measured outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

/// A rule whose extractor rejected an artifact's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub rule: String,
    pub artifact: String,
    pub message: String,
}

/// Everything known about one benchmark run.
#[derive(Debug)]
pub struct RunResult {
    pub test_name: String,
    pub result_id: String,
    pub artifacts: Vec<Artifact>,
    pub metrics: Vec<Metric>,
    pub facts: BTreeMap<String, Value>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl RunResult {
    #[must_use]
    pub const fn new(test_name: String, result_id: String) -> Self {
        Self {
            test_name,
            result_id,
            artifacts: Vec::new(),
            metrics: Vec::new(),
            facts: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    #[must_use]
    pub fn fact(&self, name: &str) -> Option<&Value> {
        self.facts.get(name)
    }

    /// Samples of the named metric, in insertion order.
    pub fn samples<'a>(&'a self, metric: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.metrics.iter().filter(move |m| m.name == metric).map(|m| &m.value)
    }
}
