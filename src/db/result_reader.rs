use super::LOG_TARGET;
use crate::Result;
use crate::extract::ExtractError;
use crate::model::{Artifact, ParseDiagnostic, RunResult};
use crate::rules::{ParseOutput, RuleSet};
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{EnrichableExt, IntoAppError, app_err, bail};
use std::collections::HashMap;
use walkdir::WalkDir;

/// Name of the subdirectory of a run directory holding its artifacts.
pub const ARTIFACTS_DIR: &str = "artifacts";

/// Split a run directory name of the form `$test_name:$result_id`.
///
/// # Errors
///
/// Returns an error if the separator is missing or either half is empty.
pub fn parse_result_name(name: &str) -> Result<(&str, &str)> {
    match name.split_once(':') {
        Some((test_name, result_id)) if !test_name.is_empty() && !result_id.is_empty() => Ok((test_name, result_id)),
        _ => Err(app_err!("invalid result name '{name}' (should be $test_name:$result_id)")),
    }
}

/// Every leaf file under `artifacts_dir`, in file name order.
fn discover_artifacts(artifacts_dir: &Utf8Path) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();

    for entry in WalkDir::new(artifacts_dir).follow_links(true).sort_by_file_name() {
        let entry = entry.into_app_err_with(|| format!("walking '{artifacts_dir}'"))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|p| app_err!("artifact path '{}' is not valid UTF-8", p.display()))?;
        let relative = path
            .strip_prefix(artifacts_dir)
            .into_app_err_with(|| format!("artifact '{path}' is outside '{artifacts_dir}'"))?;
        let name = relative.components().map(|c| c.as_str()).collect::<Vec<_>>().join("/");

        artifacts.push(Artifact::new(name, path));
    }

    Ok(artifacts)
}

/// Build the result for one run directory by running every rule over every artifact.
///
/// Content that doesn't satisfy a rule is recorded as a diagnostic on the result.
///
/// # Errors
///
/// Returns an error for a malformed directory name, a missing artifact tree, a fact
/// produced twice, or any hard extraction failure.
pub fn read_result(result_dir: &Utf8Path, rules: &RuleSet) -> Result<RunResult> {
    let dir_name = result_dir.file_name().ok_or_else(|| app_err!("result directory '{result_dir}' has no name"))?;
    let (test_name, result_id) = parse_result_name(dir_name)?;

    let artifacts_dir = result_dir.join(ARTIFACTS_DIR);
    if !artifacts_dir.is_dir() {
        bail!("result directory '{result_dir}' has no '{ARTIFACTS_DIR}' directory");
    }

    let artifacts = discover_artifacts(&artifacts_dir)?;
    log::debug!(target: LOG_TARGET, "Found {} artifacts for result '{dir_name}'", artifacts.len());

    let mut result = RunResult::new(test_name.to_string(), result_id.to_string());

    // which rule produced each fact, for duplicate reporting
    let mut producers: HashMap<String, &str> = HashMap::new();

    for artifact in &artifacts {
        for parser in rules.parsers() {
            match parser.parse(artifact) {
                Ok(ParseOutput::Skipped) => {}
                Ok(ParseOutput::Fact { name, value }) => {
                    if let Some(previous) = producers.get(&name) {
                        bail!(
                            "rule '{}' produced fact '{name}', but that was already produced by rule '{previous}'",
                            parser.name()
                        );
                    }

                    let _ = producers.insert(name.clone(), parser.name());
                    let _ = result.facts.insert(name, value);
                }
                Ok(ParseOutput::Metrics(metrics)) => result.metrics.extend(metrics),
                Err(ExtractError::ParseFailure(message)) => {
                    log::warn!(
                        target: LOG_TARGET,
                        "Rule '{}' could not parse artifact '{}' of result '{dir_name}': {message}",
                        parser.name(),
                        artifact.name()
                    );
                    result.diagnostics.push(ParseDiagnostic {
                        rule: parser.name().to_string(),
                        artifact: artifact.name().to_string(),
                        message,
                    });
                }
                Err(ExtractError::Fatal(e)) => {
                    return Err(e.enrich_with(|| format!("applying rule '{}' to artifact '{}'", parser.name(), artifact.name())));
                }
            }
        }
    }

    result.artifacts = artifacts;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Metric, UnitRegistry, Value};
    use std::fs;

    fn rules(text: &str) -> RuleSet {
        RuleSet::from_json(text, &UnitRegistry::standard()).unwrap()
    }

    fn write(path: &Utf8Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scratch() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_parse_result_name() {
        assert_eq!(parse_result_name("mytest:abc123").unwrap(), ("mytest", "abc123"));
        assert_eq!(parse_result_name("a:b:c").unwrap(), ("a", "b:c"));

        for bad in ["noseparator", ":abc", "mytest:", ":"] {
            let msg = parse_result_name(bad).unwrap_err().to_string();
            assert!(msg.contains("invalid result name"), "{msg}");
        }
    }

    #[test]
    fn test_single_metric_end_to_end() {
        let (_guard, root) = scratch();
        let result_dir = root.join("mytest:abc123");
        write(&result_dir.join("artifacts/file.txt"), "42");

        let rules = rules(r#"{"parsers": {"count": {"type": "single_metric", "artifact_regexp": "file.txt", "metric": {"name": "count", "type": "int"}}}}"#);
        let result = read_result(&result_dir, &rules).unwrap();

        assert_eq!(result.test_name, "mytest");
        assert_eq!(result.result_id, "abc123");
        assert_eq!(
            result.metrics,
            vec![Metric {
                name: "count".to_string(),
                value: Value::Int(42),
                unit: None
            }]
        );
        assert!(result.facts.is_empty());
        assert_eq!(result.artifacts.len(), 1);
    }

    #[test]
    fn test_nested_artifacts_keep_relative_names() {
        let (_guard, root) = scratch();
        let result_dir = root.join("t:1");
        write(&result_dir.join("artifacts/b/inner/x.txt"), "1");
        write(&result_dir.join("artifacts/a.txt"), "2");

        let rules = rules(r#"{"parsers": {"n": {"type": "single_metric", "artifact_regexp": "\\.txt$", "metric": {"name": "n", "type": "int"}}}}"#);
        let result = read_result(&result_dir, &rules).unwrap();

        let names: Vec<_> = result.artifacts.iter().map(Artifact::name).collect();
        assert_eq!(names, vec!["a.txt", "b/inner/x.txt"]);
        assert_eq!(result.samples("n").cloned().collect::<Vec<_>>(), vec![Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn test_duplicate_fact_names_both_rules() {
        let (_guard, root) = scratch();
        let result_dir = root.join("t:1");
        write(&result_dir.join("artifacts/version"), "6.1");

        let rules = rules(
            r#"{"parsers": {
                "first": {"type": "single_metric", "artifact_regexp": "version", "fact": {"name": "kernel", "type": "string"}},
                "second": {"type": "single_metric", "artifact_regexp": "version", "fact": {"name": "kernel", "type": "string"}}
            }}"#,
        );

        let msg = read_result(&result_dir, &rules).unwrap_err().to_string();
        assert!(msg.contains("rule 'second' produced fact 'kernel'"), "{msg}");
        assert!(msg.contains("already produced by rule 'first'"), "{msg}");
    }

    #[test]
    fn test_soft_failures_become_diagnostics() {
        let (_guard, root) = scratch();
        let result_dir = root.join("t:1");
        write(&result_dir.join("artifacts/good.txt"), "7");
        write(&result_dir.join("artifacts/bad.txt"), "seven");

        let rules = rules(r#"{"parsers": {"n": {"type": "single_metric", "artifact_regexp": "\\.txt$", "metric": {"name": "n", "type": "int"}}}}"#);
        let result = read_result(&result_dir, &rules).unwrap();

        assert_eq!(result.samples("n").cloned().collect::<Vec<_>>(), vec![Value::Int(7)]);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].rule, "n");
        assert_eq!(result.diagnostics[0].artifact, "bad.txt");
    }

    #[test]
    fn test_missing_artifacts_dir() {
        let (_guard, root) = scratch();
        let result_dir = root.join("t:1");
        fs::create_dir_all(&result_dir).unwrap();

        let rules = rules(r#"{"parsers": {"n": {"type": "single_metric", "artifact_regexp": "x", "metric": {"name": "n", "type": "int"}}}}"#);
        let msg = read_result(&result_dir, &rules).unwrap_err().to_string();
        assert!(msg.contains("has no 'artifacts' directory"), "{msg}");
    }

    #[test]
    fn test_hard_failures_abort() {
        let (_guard, root) = scratch();
        let result_dir = root.join("t:1");
        write(&result_dir.join("artifacts/data.json"), r#"{"v": [1, 2]}"#);

        let rules = rules(r#"{"parsers": {"v": {"type": "jsonpath", "artifact_regexp": "json", "jsonpath": "$.v", "fact": {"name": "v", "type": "int"}}}}"#);
        let msg = read_result(&result_dir, &rules).unwrap_err().to_string();
        assert!(msg.contains("applying rule 'v' to artifact 'data.json'"), "{msg}");
    }
}
