use super::ExtractError;
use crate::Result;
use crate::model::{Artifact, Value, ValueType};
use ohno::IntoAppError;
use serde_json_path::JsonPath;

/// Extracts values from a JSON artifact with a JSONPath query.
///
/// A query selecting several nodes, or a single array node, yields one value per
/// element.
#[derive(Debug)]
pub struct JsonPathExtractor {
    expression: String,
    path: JsonPath,
}

impl JsonPathExtractor {
    /// # Errors
    ///
    /// Returns an error if the expression is not a valid JSONPath query.
    pub fn new(expression: &str) -> Result<Self> {
        let path = JsonPath::parse(expression).into_app_err_with(|| format!("parsing JSONPath expression '{expression}'"))?;
        Ok(Self {
            expression: expression.to_string(),
            path,
        })
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub(super) fn extract(&self, artifact: &Artifact, value_type: ValueType) -> Result<Vec<Value>, ExtractError> {
        let content = artifact.content()?;

        let doc: serde_json::Value = serde_json::from_slice(content)
            .map_err(|e| ExtractError::parse_failure(format!("artifact '{}' is not valid JSON: {e}", artifact.name())))?;

        let mut raw = self.path.query(&doc).all();
        if raw.is_empty() {
            return Err(ExtractError::parse_failure(format!(
                "JSONPath '{}' matched nothing in artifact '{}'",
                self.expression,
                artifact.name()
            )));
        }

        if raw.len() == 1
            && let Some(serde_json::Value::Array(items)) = raw.first().copied()
        {
            raw = items.iter().collect();
        }

        if raw.is_empty() {
            return Err(ExtractError::parse_failure(format!(
                "JSONPath '{}' selected an empty array in artifact '{}'",
                self.expression,
                artifact.name()
            )));
        }

        raw.into_iter().map(|node| coerce(node, value_type)).collect()
    }
}

fn coerce(node: &serde_json::Value, value_type: ValueType) -> Result<Value, ExtractError> {
    let value = match (value_type, node) {
        (ValueType::Int, serde_json::Value::Number(n)) => n.as_i64().map(Value::Int),
        (ValueType::Float, serde_json::Value::Number(n)) => n.as_f64().map(Value::Float),
        (ValueType::String, serde_json::Value::String(s)) => Some(Value::String(s.clone())),
        (ValueType::Bool, serde_json::Value::Bool(b)) => Some(Value::Bool(*b)),
        _ => None,
    };

    value.ok_or_else(|| ExtractError::parse_failure(format!("JSONPath returned {node}, wanted {value_type}")))
}
