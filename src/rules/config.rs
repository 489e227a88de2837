//! Decoding of the rule file.
//!
//! The rule file is a JSON object of the form `{"parsers": {"<rule name>": {...}}}`.
//! Each rule is decoded in two passes: a lenient envelope pass that learns the
//! rule type and target, then a strict pass over the full object that rejects
//! unknown fields and fields belonging to a different rule type.

use super::{Parser, ParserTarget};
use crate::Result;
use crate::extract::{CommandExtractor, Extractor, JsonPathExtractor, KeyValueExtractor, PatternExtractor, PresenceExtractor};
use crate::model::{RESERVED_FACT_NAMES, UnitRegistry, Value, ValueType, is_reserved_fact_name};
use camino::Utf8Path;
use core::str::FromStr;
use ohno::{EnrichableExt, IntoAppError, app_err, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use strum::{Display, EnumString};

/// Default name of the rule file inside a result database.
pub const RULES_FILE_NAME: &str = "parsers.json";

/// Pattern used by `single_metric` rules: the artifact must hold exactly one non-empty line.
const SINGLE_VALUE_PATTERN: &str = ".+";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
enum RuleType {
    SingleMetric,
    #[strum(to_string = "jsonpath")]
    JsonPath,
    #[strum(to_string = "shellvar")]
    ShellVar,
    Command,
    ArtifactPresence,
    #[strum(to_string = "regexp")]
    Regexp,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    parsers: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    rule_type: String,

    #[serde(default)]
    artifact_regexp: String,

    metric: Option<serde_json::Value>,
    fact: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetricSpec {
    #[serde(default)]
    name: String,

    #[serde(rename = "type", default)]
    value_type: String,

    #[serde(default)]
    unit: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FactSpec {
    #[serde(default)]
    name: String,

    #[serde(rename = "type", default)]
    value_type: String,
}

/// Every field a rule object may carry. Which type-specific fields are allowed
/// depends on the rule type.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
#[expect(dead_code, reason = "envelope fields are validated in the first pass")]
struct RuleFields {
    #[serde(rename = "type")]
    rule_type: serde_json::Value,
    artifact_regexp: serde_json::Value,
    metric: Option<serde_json::Value>,
    fact: Option<serde_json::Value>,

    jsonpath: Option<String>,
    var: Option<String>,
    args: Option<Vec<String>>,
    result: Option<serde_json::Value>,
    pattern: Option<String>,
}

impl RuleFields {
    fn present_extras(&self) -> Vec<&'static str> {
        [
            ("jsonpath", self.jsonpath.is_some()),
            ("var", self.var.is_some()),
            ("args", self.args.is_some()),
            ("result", self.result.is_some()),
            ("pattern", self.pattern.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

const fn extra_field(rule_type: RuleType) -> Option<&'static str> {
    match rule_type {
        RuleType::SingleMetric => None,
        RuleType::JsonPath => Some("jsonpath"),
        RuleType::ShellVar => Some("var"),
        RuleType::Command => Some("args"),
        RuleType::ArtifactPresence => Some("result"),
        RuleType::Regexp => Some("pattern"),
    }
}

/// The complete, validated set of rules of a result database.
#[derive(Debug)]
pub struct RuleSet {
    parsers: Vec<Parser>,
}

impl RuleSet {
    /// Load the rule file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid rule file.
    pub fn load(path: &Utf8Path, units: &UnitRegistry) -> Result<Self> {
        let text = fs::read_to_string(path).into_app_err_with(|| format!("reading rule file '{path}'"))?;
        Self::from_json(&text, units).map_err(|e| e.enrich_with(|| format!("loading rule file '{path}'")))
    }

    /// Decode a rule file.
    ///
    /// Rules are kept in name order.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, unknown fields, invalid rules, or a file without rules.
    pub fn from_json(text: &str, units: &UnitRegistry) -> Result<Self> {
        let file: RuleFile = serde_json::from_str(text).into_app_err("decoding rule file")?;

        let parsers = file
            .parsers
            .iter()
            .map(|(name, raw)| parser_from_config(raw, name, units).map_err(|e| e.enrich_with(|| format!("configuring rule '{name}'"))))
            .collect::<Result<Vec<_>>>()?;

        if parsers.is_empty() {
            bail!("no 'parsers' defined");
        }

        Ok(Self { parsers })
    }

    #[must_use]
    pub fn parsers(&self) -> &[Parser] {
        &self.parsers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

/// Build one parser from its rule object.
///
/// # Errors
///
/// Returns a descriptive error for the first problem found.
pub fn parser_from_config(raw: &serde_json::Value, name: &str, units: &UnitRegistry) -> Result<Parser> {
    let envelope = Envelope::deserialize(raw).into_app_err("decoding rule envelope")?;

    if envelope.rule_type.is_empty() {
        bail!("missing or empty 'type' field");
    }

    if envelope.artifact_regexp.is_empty() {
        bail!("missing or empty 'artifact_regexp' field");
    }

    let target = match (&envelope.metric, &envelope.fact) {
        (Some(metric), None) => metric_target(metric, units)?,
        (None, Some(fact)) => fact_target(fact)?,
        _ => bail!("specify exactly one of 'metric' and 'fact'"),
    };

    let rule_type =
        RuleType::from_str(&envelope.rule_type).map_err(|_unknown| app_err!("unknown rule type '{}'", envelope.rule_type))?;

    let fields = RuleFields::deserialize(raw).into_app_err_with(|| format!("decoding '{rule_type}' rule"))?;

    let allowed = extra_field(rule_type);
    if let Some(foreign) = fields.present_extras().into_iter().find(|field| Some(*field) != allowed) {
        bail!("field '{foreign}' is not valid for a '{rule_type}' rule");
    }

    let extractor = match rule_type {
        RuleType::SingleMetric => Extractor::Pattern(PatternExtractor::new(SINGLE_VALUE_PATTERN)?),
        RuleType::Regexp => Extractor::Pattern(PatternExtractor::new(&required(fields.pattern, "pattern")?)?),
        RuleType::JsonPath => Extractor::JsonPath(JsonPathExtractor::new(&required(fields.jsonpath, "jsonpath")?)?),
        RuleType::ShellVar => Extractor::KeyValue(KeyValueExtractor::new(&required(fields.var, "var")?)?),
        RuleType::Command => Extractor::Command(CommandExtractor::new(
            fields.args.ok_or_else(|| app_err!("missing 'args' field"))?,
        )?),
        RuleType::ArtifactPresence => {
            let literal = fields.result.ok_or_else(|| app_err!("missing 'result' field"))?;
            Extractor::Presence(PresenceExtractor::new(literal_value(&literal, target.value_type)?))
        }
    };

    Parser::new(name, &envelope.artifact_regexp, target, extractor)
}

fn metric_target(raw: &serde_json::Value, units: &UnitRegistry) -> Result<ParserTarget> {
    let spec = MetricSpec::deserialize(raw).into_app_err("decoding 'metric' field")?;

    if spec.name.is_empty() {
        bail!("missing or empty 'metric.name' field");
    }

    if spec.value_type.is_empty() {
        bail!("missing or empty 'metric.type' field");
    }

    let value_type = ValueType::parse(&spec.value_type).map_err(|e| e.enrich("parsing metric type"))?;
    let unit = units.lookup(&spec.unit).map_err(|e| e.enrich("parsing metric unit"))?;

    Ok(ParserTarget::metric(spec.name, value_type, unit))
}

fn fact_target(raw: &serde_json::Value) -> Result<ParserTarget> {
    let spec = FactSpec::deserialize(raw).into_app_err("decoding 'fact' field")?;

    if spec.name.is_empty() {
        bail!("missing or empty 'fact.name' field");
    }

    if spec.value_type.is_empty() {
        bail!("missing or empty 'fact.type' field");
    }

    if is_reserved_fact_name(&spec.name) {
        bail!("fact name '{}' is reserved ({})", spec.name, RESERVED_FACT_NAMES.join(", "));
    }

    let value_type = ValueType::parse(&spec.value_type).map_err(|e| e.enrich("parsing fact type"))?;

    Ok(ParserTarget::fact(spec.name, value_type))
}

fn required(field: Option<String>, name: &str) -> Result<String> {
    match field {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(app_err!("missing or empty '{name}' field")),
    }
}

/// Convert the literal of an `artifact_presence` rule to the target's type.
fn literal_value(literal: &serde_json::Value, value_type: ValueType) -> Result<Value> {
    let value = match (value_type, literal) {
        (ValueType::Int, serde_json::Value::Number(n)) => n.as_i64().map(Value::Int),
        (ValueType::Float, serde_json::Value::Number(n)) => n.as_f64().map(Value::Float),
        (ValueType::String, serde_json::Value::String(s)) => Some(Value::String(s.clone())),
        (ValueType::Bool, serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
        _ => None,
    };

    value.ok_or_else(|| app_err!("'result' value {literal} is not a valid {value_type}"))
}
