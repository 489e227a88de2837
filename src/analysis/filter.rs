use crate::Result;
use crate::model::{RunResult, Value, ValueType};
use cel_interpreter::{Context, Program, Value as CelValue};
use ohno::{IntoAppError, app_err};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Expression used when no filter is given.
pub const MATCH_ALL: &str = "true";

/// A boolean CEL expression selecting the results to analyze.
///
/// Every declared fact is bound as a variable, null when the result lacks it,
/// along with `test_name` and `result_id`.
#[derive(Debug, Clone)]
pub struct ResultFilter {
    expression: String,
    program: Arc<Program>,
}

impl ResultFilter {
    /// # Errors
    ///
    /// Returns an error if the expression doesn't parse.
    pub fn new(expression: &str) -> Result<Self> {
        let expression = if expression.trim().is_empty() { MATCH_ALL } else { expression };
        let program = Program::compile(expression).map_err(|e| app_err!("could not parse filter '{expression}': {e}"))?;

        Ok(Self {
            expression: expression.to_string(),
            program: Arc::new(program),
        })
    }

    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Evaluate the filter for one result.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails or doesn't produce a boolean.
    pub fn matches(&self, result: &RunResult, fact_types: &BTreeMap<String, ValueType>) -> Result<bool> {
        let mut context = Context::default();
        for name in fact_types.keys() {
            context.add_variable_from_value(name.as_str(), result.fact(name).map_or(CelValue::Null, to_cel));
        }
        context.add_variable_from_value("test_name", CelValue::String(Arc::new(result.test_name.clone())));
        context.add_variable_from_value("result_id", CelValue::String(Arc::new(result.result_id.clone())));

        match self
            .program
            .execute(&context)
            .into_app_err_with(|| format!("evaluating filter '{}' for result '{}'", self.expression, result.result_id))?
        {
            CelValue::Bool(b) => Ok(b),
            other => Err(app_err!("filter '{}' did not return a boolean, got '{other:?}' instead", self.expression)),
        }
    }
}

fn to_cel(value: &Value) -> CelValue {
    match value {
        Value::Int(v) => CelValue::Int(*v),
        Value::Float(v) => CelValue::Float(*v),
        Value::String(v) => CelValue::String(Arc::new(v.clone())),
        Value::Bool(v) => CelValue::Bool(*v),
    }
}
