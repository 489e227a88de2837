use super::functional_dependency::{self, CounterExample, Dependency};
use super::histogram::{self, DEFAULT_BINS, Histogram};
use super::{LOG_TARGET, ResultFilter};
use crate::Result;
use crate::db::Database;
use crate::model::Value;
use ohno::{EnrichableExt, bail};
use serde::Serialize;

/// What to compare: a metric, grouped by the values of a fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    /// The independent variable.
    pub fact: String,

    /// The dependent variable, which must be numeric.
    pub metric: String,

    /// CEL expression selecting the results to compare, all of them when `None`.
    pub filter: Option<String>,

    /// Number of histogram bins per group.
    pub bins: usize,
}

impl CompareRequest {
    #[must_use]
    pub fn new(fact: impl Into<String>, metric: impl Into<String>) -> Self {
        Self {
            fact: fact.into(),
            metric: metric.into(),
            filter: None,
            bins: DEFAULT_BINS,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub const fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }
}

/// Statistics for the samples pooled from every result sharing one fact value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub fact_value: Value,
    pub test_name: String,
    pub results: usize,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: Option<f64>,
    pub histogram: Histogram,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// The fact doesn't determine the other varying attributes, so no groups were computed.
    Confounded(CounterExample),
    Groups(Vec<GroupStats>),
}

/// Group the selected results by the request's fact and summarize the metric per group.
///
/// A confounded grouping is a normal outcome, reported as [`Comparison::Confounded`].
///
/// # Errors
///
/// Returns an error for an unknown fact or metric, a non-numeric metric, a bad
/// filter, or when no selected result has a sample of the metric.
pub fn compare(db: &Database, request: &CompareRequest) -> Result<Comparison> {
    let fact_types = db.fact_types();
    let Some(metric) = db.metric_types().get(&request.metric) else {
        bail!(
            "no metric '{}' (have: {})",
            request.metric,
            db.metric_types().keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        );
    };
    if !fact_types.contains_key(&request.fact) {
        bail!(
            "no fact '{}' (have: {})",
            request.fact,
            fact_types.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        );
    }
    if !metric.value_type.is_numeric() {
        bail!(
            "metric '{}' is of type {}, only int and float metrics can be compared",
            request.metric,
            metric.value_type
        );
    }

    let filter = ResultFilter::new(request.filter.as_deref().unwrap_or_default())?;
    let mut selected = Vec::new();
    for result in db.results() {
        if filter.matches(result, fact_types)? {
            selected.push(result);
        }
    }

    let partitions = functional_dependency::partition_by_fact(selected, &request.fact);
    log::debug!(
        target: LOG_TARGET,
        "Comparing '{}' across {} values of '{}' with filter '{}'",
        request.metric,
        partitions.len(),
        request.fact,
        filter.expression()
    );

    let other_facts: Vec<&str> = fact_types.keys().map(String::as_str).filter(|name| *name != request.fact).collect();
    if let Dependency::Confounded(example) = functional_dependency::check(&request.fact, &partitions, &other_facts) {
        return Ok(Comparison::Confounded(example));
    }

    let pooled: Vec<(&functional_dependency::Partition<'_>, Vec<f64>)> = partitions
        .iter()
        .filter_map(|partition| {
            let samples: Vec<f64> = partition
                .results
                .iter()
                .flat_map(|result| result.samples(&request.metric))
                .filter_map(Value::to_f64)
                .collect();

            if samples.is_empty() {
                log::warn!(
                    target: LOG_TARGET,
                    "No samples of metric '{}' for {} = {}, leaving the group out",
                    request.metric,
                    request.fact,
                    partition.value
                );
                return None;
            }

            Some((partition, samples))
        })
        .collect();

    for (partition, samples) in &pooled {
        if let Some(bad) = samples.iter().find(|x| !x.is_finite()) {
            bail!(
                "metric '{}' has the non-finite sample {bad} for {} = {}",
                request.metric,
                request.fact,
                partition.value
            );
        }
    }

    let Some(range) = histogram::default_range(pooled.iter().flat_map(|(_, samples)| samples.iter().copied())) else {
        bail!("no selected result has a sample of metric '{}'", request.metric);
    };

    pooled
        .into_iter()
        .map(|(partition, samples)| {
            let histogram = Histogram::build(&samples, request.bins, range)
                .map_err(|e| e.enrich_with(|| format!("binning {} = {}", request.fact, partition.value)))?;
            let (mean, min, max, std_dev) = summarize(&samples);

            Ok(GroupStats {
                fact_value: partition.value.clone(),
                test_name: partition.results.first().map(|r| r.test_name.clone()).unwrap_or_default(),
                results: partition.results.len(),
                count: samples.len(),
                mean,
                min,
                max,
                std_dev,
                histogram,
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Comparison::Groups)
}

/// Mean, minimum, maximum, and sample standard deviation of a non-empty slice.
#[expect(clippy::cast_precision_loss, reason = "sample counts are small")]
fn summarize(samples: &[f64]) -> (f64, f64, f64, Option<f64>) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let std_dev = (samples.len() >= 2).then(|| {
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt()
    });

    (mean, min, max, std_dev)
}
