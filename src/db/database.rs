use super::{LOG_TARGET, read_result};
use crate::Result;
use crate::model::{ParseDiagnostic, RunResult, Unit, UnitRegistry, ValueType};
use crate::rules::{RULES_FILE_NAME, RuleSet, TargetKind};
use camino::{Utf8Path, Utf8PathBuf};
use futures_util::future::join_all;
use ohno::{EnrichableExt, IntoAppError, bail};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::sync::Arc;

/// Settings for loading a result database.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Name of the rule file in the database root.
    pub rules_file_name: String,

    /// Units that metric rules may reference.
    pub units: UnitRegistry,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            rules_file_name: RULES_FILE_NAME.to_string(),
            units: UnitRegistry::standard(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSchema {
    pub value_type: ValueType,
    pub unit: Option<Unit>,
}

/// The declared type of every fact and metric, derived from the rules alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub facts: BTreeMap<String, ValueType>,
    pub metrics: BTreeMap<String, MetricSchema>,
}

impl Schema {
    /// Collect the targets of every rule.
    ///
    /// Several rules may produce the same name, but they must agree on its type,
    /// and metric rules also on its unit.
    ///
    /// # Errors
    ///
    /// Returns an error if two rules declare the same name with different types or units.
    pub fn infer(rules: &RuleSet) -> Result<Self> {
        let mut schema = Self::default();
        let mut declared: BTreeMap<&str, (ValueType, &str)> = BTreeMap::new();

        for parser in rules.parsers() {
            let target = parser.target();

            match declared.entry(target.name.as_str()) {
                Entry::Occupied(e) => {
                    let (value_type, rule) = *e.get();
                    if value_type != target.value_type {
                        bail!(
                            "rule '{}' produces '{}' as {}, but rule '{rule}' produces it as {value_type}",
                            parser.name(),
                            target.name,
                            target.value_type
                        );
                    }
                }
                Entry::Vacant(e) => {
                    let _ = e.insert((target.value_type, parser.name()));
                }
            }

            match target.kind {
                TargetKind::Fact => {
                    let _ = schema.facts.insert(target.name.clone(), target.value_type);
                }
                TargetKind::Metric => match schema.metrics.entry(target.name.clone()) {
                    Entry::Occupied(e) => {
                        if e.get().unit != target.unit {
                            let first = declared.get(target.name.as_str()).map_or("?", |(_, rule)| *rule);
                            bail!(
                                "rule '{}' declares metric '{}' in {}, but rule '{first}' declares it in {}",
                                parser.name(),
                                target.name,
                                unit_name(target.unit),
                                unit_name(e.get().unit)
                            );
                        }
                    }
                    Entry::Vacant(e) => {
                        let _ = e.insert(MetricSchema {
                            value_type: target.value_type,
                            unit: target.unit,
                        });
                    }
                },
            }
        }

        Ok(schema)
    }
}

fn unit_name(unit: Option<Unit>) -> &'static str {
    unit.map_or("no unit", |u| u.short_name)
}

/// Every result of a database root, with the schema its rules declare.
#[derive(Debug)]
pub struct Database {
    root: Utf8PathBuf,
    schema: Schema,
    results: BTreeMap<String, RunResult>,
}

impl Database {
    /// Load a database root.
    ///
    /// The rules are loaded and checked for conflicting types first. Each run
    /// directory is then assembled on the blocking thread pool and the results are
    /// merged in directory name order.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid rule file, a schema conflict, any run
    /// directory that fails to assemble, or two directories sharing a result ID.
    pub async fn load(root: &Utf8Path, options: &LoadOptions) -> Result<Self> {
        let rules = RuleSet::load(&root.join(&options.rules_file_name), &options.units)?;
        let schema = Schema::infer(&rules)?;
        log::info!(target: LOG_TARGET, "Loaded {} rules from '{root}'", rules.len());

        let result_dirs = list_result_dirs(root, &options.rules_file_name)?;
        let rules = Arc::new(rules);

        let tasks = result_dirs.into_iter().map(|dir| {
            let rules = Arc::clone(&rules);
            tokio::task::spawn_blocking(move || read_result(&dir, &rules).map_err(|e| e.enrich_with(|| format!("reading result from '{dir}'"))))
        });

        let mut results = Vec::new();
        for outcome in join_all(tasks).await {
            results.push(outcome.into_app_err("result assembly task failed")??);
        }

        let db = Self::from_results(root, schema, results)?;
        log::info!(target: LOG_TARGET, "Loaded {} results from '{root}'", db.len());
        Ok(db)
    }

    /// Assemble a database from already-built results.
    ///
    /// # Errors
    ///
    /// Returns an error if two results share a result ID.
    pub fn from_results(root: impl Into<Utf8PathBuf>, schema: Schema, results: impl IntoIterator<Item = RunResult>) -> Result<Self> {
        let mut merged: BTreeMap<String, RunResult> = BTreeMap::new();

        for result in results {
            match merged.entry(result.result_id.clone()) {
                Entry::Occupied(e) => bail!(
                    "result ID '{}' is used by both '{}:{}' and '{}:{}'",
                    result.result_id,
                    e.get().test_name,
                    e.get().result_id,
                    result.test_name,
                    result.result_id
                ),
                Entry::Vacant(e) => {
                    let _ = e.insert(result);
                }
            }
        }

        Ok(Self {
            root: root.into(),
            schema,
            results: merged,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn fact_types(&self) -> &BTreeMap<String, ValueType> {
        &self.schema.facts
    }

    #[must_use]
    pub const fn metric_types(&self) -> &BTreeMap<String, MetricSchema> {
        &self.schema.metrics
    }

    /// Results in result ID order.
    pub fn results(&self) -> impl Iterator<Item = &RunResult> {
        self.results.values()
    }

    #[must_use]
    pub fn result(&self, result_id: &str) -> Option<&RunResult> {
        self.results.get(result_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Every parse diagnostic, paired with the result it was recorded on.
    pub fn diagnostics(&self) -> impl Iterator<Item = (&RunResult, &ParseDiagnostic)> {
        self.results().flat_map(|r| r.diagnostics.iter().map(move |d| (r, d)))
    }
}

/// Run directories of a database root, sorted by name.
fn list_result_dirs(root: &Utf8Path, rules_file_name: &str) -> Result<Vec<Utf8PathBuf>> {
    let mut dirs = Vec::new();

    for entry in root.read_dir_utf8().into_app_err_with(|| format!("opening database root '{root}'"))? {
        let entry = entry.into_app_err_with(|| format!("listing database root '{root}'"))?;
        if entry.file_name() == rules_file_name {
            continue;
        }

        let path = entry.into_path();
        if !fs::metadata(&path).into_app_err_with(|| format!("inspecting '{path}'"))?.is_dir() {
            log::warn!(target: LOG_TARGET, "Skipping '{path}', which is not a result directory");
            continue;
        }

        dirs.push(path);
    }

    dirs.sort();
    Ok(dirs)
}
