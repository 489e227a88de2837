//! Export of a database into an analytical SQL store.
//!
//! The export is a pair of JSON row files plus a `schema.sql` script that loads
//! them into DuckDB. The `results` table has one row per result and one column per
//! declared fact. The `metrics` table has one row per metric sample, with the value
//! held in the column matching its type (`int_value`, `float_value`, ...).

use super::{Database, LOG_TARGET};
use crate::Result;
use crate::model::ValueType;
use camino::{Utf8Path, Utf8PathBuf};
use core::fmt::Write as _;
use ohno::{IntoAppError, bail};
use serde_json::{Map, Value as Json};
use std::fs;
use strum::IntoEnumIterator;

pub const RESULTS_FILE: &str = "results.json";
pub const METRICS_FILE: &str = "metrics.json";
pub const SCHEMA_FILE: &str = "schema.sql";

/// Paths written by [`export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFiles {
    pub results: Utf8PathBuf,
    pub metrics: Utf8PathBuf,
    pub schema: Utf8PathBuf,
}

/// Check that a fact or metric name can be used as a SQL identifier.
///
/// # Errors
///
/// Returns an error unless the name is a letter followed by letters, digits, and underscores.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        bail!("'{name}' cannot be used as a SQL identifier (must match [A-Za-z][A-Za-z0-9_]*)");
    }

    Ok(())
}

fn validate_schema(db: &Database) -> Result<()> {
    for name in db.fact_types().keys().chain(db.metric_types().keys()) {
        validate_identifier(name)?;
    }
    Ok(())
}

/// One row per result: `test_name`, `result_id`, then every declared fact, null when missing.
#[must_use]
pub fn results_rows(db: &Database) -> Vec<Json> {
    db.results()
        .map(|result| {
            let mut row = Map::new();
            let _ = row.insert("test_name".to_string(), Json::from(result.test_name.as_str()));
            let _ = row.insert("result_id".to_string(), Json::from(result.result_id.as_str()));

            for name in db.fact_types().keys() {
                let value = result.fact(name).map_or(Json::Null, |v| serde_json::to_value(v).unwrap_or(Json::Null));
                let _ = row.insert(name.clone(), value);
            }

            Json::Object(row)
        })
        .collect()
}

/// One row per metric sample.
#[must_use]
pub fn metrics_rows(db: &Database) -> Vec<Json> {
    db.results()
        .flat_map(|result| {
            result.metrics.iter().map(|metric| {
                let mut row = Map::new();
                let _ = row.insert("result_id".to_string(), Json::from(result.result_id.as_str()));
                let _ = row.insert("metric".to_string(), Json::from(metric.name.as_str()));
                let _ = row.insert(
                    "unit".to_string(),
                    metric.unit.map_or(Json::Null, |u| Json::from(u.short_name)),
                );

                for value_type in ValueType::iter() {
                    let value = if metric.value.value_type() == value_type {
                        serde_json::to_value(&metric.value).unwrap_or(Json::Null)
                    } else {
                        Json::Null
                    };
                    let _ = row.insert(value_type.storage_column().to_string(), value);
                }

                Json::Object(row)
            })
        })
        .collect()
}

fn sql_string(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// The script that creates the `results` and `metrics` tables from the row files.
///
/// # Errors
///
/// Returns an error if a fact or metric name is not a valid SQL identifier.
pub fn schema_sql(db: &Database, results_path: &Utf8Path, metrics_path: &Utf8Path) -> Result<String> {
    validate_schema(db)?;

    let mut results_columns = vec![
        ("test_name".to_string(), ValueType::String.sql_type()),
        ("result_id".to_string(), ValueType::String.sql_type()),
    ];
    results_columns.extend(db.fact_types().iter().map(|(name, t)| (name.clone(), t.sql_type())));

    let mut metrics_columns = vec![
        ("result_id".to_string(), ValueType::String.sql_type()),
        ("metric".to_string(), ValueType::String.sql_type()),
        ("unit".to_string(), ValueType::String.sql_type()),
    ];
    metrics_columns.extend(ValueType::iter().map(|t| (t.storage_column().to_string(), t.sql_type())));

    let mut sql = String::new();
    for (table, path, columns) in [("results", results_path, &results_columns), ("metrics", metrics_path, &metrics_columns)] {
        let columns = columns
            .iter()
            .map(|(name, sql_type)| format!("{}: {}", sql_string(name), sql_string(sql_type)))
            .collect::<Vec<_>>()
            .join(", ");

        let _ = writeln!(
            sql,
            "CREATE OR REPLACE TABLE {table} AS SELECT * FROM read_json({}, format = 'array', columns = {{{columns}}});",
            sql_string(path.as_str())
        );
    }

    Ok(sql)
}

/// Write the row files and the schema script into `out_dir`.
///
/// # Errors
///
/// Returns an error for an invalid identifier or if any file cannot be written.
pub fn export(db: &Database, out_dir: &Utf8Path) -> Result<StoreFiles> {
    validate_schema(db)?;
    fs::create_dir_all(out_dir).into_app_err_with(|| format!("creating directory '{out_dir}'"))?;

    let files = StoreFiles {
        results: out_dir.join(RESULTS_FILE),
        metrics: out_dir.join(METRICS_FILE),
        schema: out_dir.join(SCHEMA_FILE),
    };

    write_json(&files.results, &results_rows(db))?;
    write_json(&files.metrics, &metrics_rows(db))?;

    let sql = schema_sql(db, &files.results, &files.metrics)?;
    fs::write(&files.schema, sql).into_app_err_with(|| format!("writing '{}'", files.schema))?;

    log::info!(target: LOG_TARGET, "Exported {} results to '{out_dir}'", db.len());
    Ok(files)
}

fn write_json(path: &Utf8Path, rows: &[Json]) -> Result<()> {
    let text = serde_json::to_string_pretty(rows).into_app_err_with(|| format!("serializing '{path}'"))?;
    fs::write(path, text).into_app_err_with(|| format!("writing '{path}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MetricSchema, Schema};
    use crate::model::{Metric, RunResult, Value};
    use serde_json::json;

    fn database(fact_name: &str) -> Database {
        let mut schema = Schema::default();
        let _ = schema.facts.insert(fact_name.to_string(), ValueType::String);
        let _ = schema.facts.insert("threads".to_string(), ValueType::Int);
        let _ = schema.metrics.insert(
            "latency".to_string(),
            MetricSchema {
                value_type: ValueType::Float,
                unit: None,
            },
        );

        let mut with_fact = RunResult::new("bench".to_string(), "a".to_string());
        let _ = with_fact.facts.insert(fact_name.to_string(), Value::String("6.1".to_string()));
        with_fact.metrics.push(Metric {
            name: "latency".to_string(),
            value: Value::Float(1.5),
            unit: None,
        });

        let without_fact = RunResult::new("bench".to_string(), "b".to_string());

        Database::from_results("/db", schema, [with_fact, without_fact]).unwrap()
    }

    #[test]
    fn test_validate_identifier() {
        for good in ["a", "kernel", "Kernel_2", "x_1_y"] {
            validate_identifier(good).unwrap();
        }

        for bad in ["", "1abc", "_x", "has space", "semi;colon", "quote'", "ünï"] {
            let msg = validate_identifier(bad).unwrap_err().to_string();
            assert!(msg.contains("SQL identifier"), "{msg}");
        }
    }

    #[test]
    fn test_results_rows() {
        let rows = results_rows(&database("kernel"));
        assert_eq!(
            rows,
            vec![
                json!({"test_name": "bench", "result_id": "a", "kernel": "6.1", "threads": null}),
                json!({"test_name": "bench", "result_id": "b", "kernel": null, "threads": null}),
            ]
        );
    }

    #[test]
    fn test_metrics_rows() {
        let rows = metrics_rows(&database("kernel"));
        assert_eq!(
            rows,
            vec![json!({
                "result_id": "a",
                "metric": "latency",
                "unit": null,
                "int_value": null,
                "float_value": 1.5,
                "string_value": null,
                "bool_value": null
            })]
        );
    }

    #[test]
    fn test_schema_sql() {
        let sql = schema_sql(&database("kernel"), Utf8Path::new("/out/results.json"), Utf8Path::new("/out/it's.json")).unwrap();
        insta::assert_snapshot!(sql.trim_end(), @r"
        CREATE OR REPLACE TABLE results AS SELECT * FROM read_json('/out/results.json', format = 'array', columns = {'test_name': 'VARCHAR', 'result_id': 'VARCHAR', 'kernel': 'VARCHAR', 'threads': 'BIGINT'});
        CREATE OR REPLACE TABLE metrics AS SELECT * FROM read_json('/out/it''s.json', format = 'array', columns = {'result_id': 'VARCHAR', 'metric': 'VARCHAR', 'unit': 'VARCHAR', 'int_value': 'BIGINT', 'float_value': 'DOUBLE', 'string_value': 'VARCHAR', 'bool_value': 'BOOLEAN'});
        ");
    }

    #[test]
    fn test_invalid_identifier_blocks_export() {
        let dir = tempfile::tempdir().unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().join("store")).unwrap();

        let msg = export(&database("bad name"), &out).unwrap_err().to_string();
        assert!(msg.contains("'bad name' cannot be used as a SQL identifier"), "{msg}");
        assert!(!out.exists());
    }

    #[test]
    fn test_export_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = Utf8PathBuf::from_path_buf(dir.path().join("store")).unwrap();

        let files = export(&database("kernel"), &out).unwrap();
        let results: Json = serde_json::from_str(&fs::read_to_string(&files.results).unwrap()).unwrap();
        assert_eq!(results.as_array().unwrap().len(), 2);
        assert!(fs::read_to_string(&files.schema).unwrap().contains("CREATE OR REPLACE TABLE metrics"));
    }
}
