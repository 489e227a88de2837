//! Soundness check for comparing groups of results.
//!
//! Grouping results by an experiment fact is only meaningful when that fact
//! determines everything else that varies: the test that ran and every other
//! declared fact. If two results share the experiment value but differ in some
//! other fact, a difference between groups can't be attributed to the
//! experiment fact alone.

use crate::model::{RunResult, Value};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Results sharing one value of a fact.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub value: Value,
    pub results: Vec<&'a RunResult>,
}

/// Partition `results` by the value of `fact`, ordered by value.
///
/// Results without the fact belong to no partition.
#[must_use]
pub fn partition_by_fact<'a>(results: impl IntoIterator<Item = &'a RunResult>, fact: &str) -> Vec<Partition<'a>> {
    let mut partitions: Vec<Partition<'a>> = Vec::new();

    for result in results {
        let Some(value) = result.fact(fact) else {
            continue;
        };

        match partitions.iter_mut().find(|p| p.value == *value) {
            Some(partition) => partition.results.push(result),
            None => partitions.push(Partition {
                value: value.clone(),
                results: vec![result],
            }),
        }
    }

    partitions.sort_by(|a, b| a.value.sort_cmp(&b.value));
    partitions
}

/// The test name and other facts shared by some results of a partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combination {
    pub test_name: String,
    pub facts: BTreeMap<String, Option<Value>>,
}

/// Evidence that a fact doesn't determine the other varying attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CounterExample {
    pub fact: String,
    pub fact_value: Value,

    /// Every distinct combination seen with `fact_value`, at least two.
    pub combinations: Vec<Combination>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    Sound,
    Confounded(CounterExample),
}

impl Dependency {
    #[must_use]
    pub const fn is_sound(&self) -> bool {
        matches!(self, Self::Sound)
    }
}

/// Check that `fact` functionally determines the test name and `other_facts`
/// over the given partitions, which must have been made by [`partition_by_fact`].
///
/// The first offending partition in value order is reported.
#[must_use]
pub fn check(fact: &str, partitions: &[Partition<'_>], other_facts: &[&str]) -> Dependency {
    for partition in partitions {
        let mut seen = BTreeSet::new();
        let mut combinations = Vec::new();

        for result in &partition.results {
            let facts: BTreeMap<String, Option<Value>> = other_facts
                .iter()
                .map(|name| ((*name).to_string(), result.fact(name).cloned()))
                .collect();

            let key = combination_key(&result.test_name, &facts);
            if seen.insert(key) {
                combinations.push(Combination {
                    test_name: result.test_name.clone(),
                    facts,
                });
            }
        }

        if combinations.len() > 1 {
            return Dependency::Confounded(CounterExample {
                fact: fact.to_string(),
                fact_value: partition.value.clone(),
                combinations,
            });
        }
    }

    Dependency::Sound
}

// Values are compared by type and text since floats aren't Eq.
fn combination_key(test_name: &str, facts: &BTreeMap<String, Option<Value>>) -> Vec<(String, String)> {
    let mut key = vec![(String::new(), test_name.to_string())];
    key.extend(facts.iter().map(|(name, value)| {
        let text = value.as_ref().map_or_else(String::new, |v| format!("{}:{v}", v.value_type()));
        (name.clone(), text)
    }));
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, test_name: &str, facts: &[(&str, &str)]) -> RunResult {
        let mut result = RunResult::new(test_name.to_string(), id.to_string());
        for (name, value) in facts {
            let _ = result.facts.insert((*name).to_string(), Value::String((*value).to_string()));
        }
        result
    }

    fn check_results(results: &[RunResult]) -> Dependency {
        let partitions = partition_by_fact(results, "exp");
        check("exp", &partitions, &["other"])
    }

    #[test]
    fn test_partition_orders_by_value_and_skips_missing() {
        let results = [
            result("1", "t", &[("exp", "b")]),
            result("2", "t", &[("exp", "a")]),
            result("3", "t", &[]),
            result("4", "t", &[("exp", "b")]),
        ];

        let partitions = partition_by_fact(&results, "exp");
        let summary: Vec<(String, Vec<&str>)> = partitions
            .iter()
            .map(|p| (p.value.to_string(), p.results.iter().map(|r| r.result_id.as_str()).collect()))
            .collect();

        assert_eq!(
            summary,
            vec![("a".to_string(), vec!["2"]), ("b".to_string(), vec!["1", "4"])]
        );
    }

    #[test]
    fn test_sound_when_fact_determines_the_rest() {
        let results = [
            result("1", "T", &[("exp", "A"), ("other", "X")]),
            result("2", "T", &[("exp", "A"), ("other", "X")]),
            result("3", "T", &[("exp", "B"), ("other", "Y")]),
        ];

        assert!(check_results(&results).is_sound());
    }

    #[test]
    fn test_confounded_by_other_fact() {
        let results = [
            result("1", "T", &[("exp", "A"), ("other", "X")]),
            result("2", "T", &[("exp", "A"), ("other", "Y")]),
        ];

        let Dependency::Confounded(example) = check_results(&results) else {
            panic!("expected a counter-example");
        };

        assert_eq!(example.fact, "exp");
        assert_eq!(example.fact_value, Value::String("A".to_string()));
        assert_eq!(example.combinations.len(), 2);
        assert_eq!(example.combinations[0].facts["other"], Some(Value::String("X".to_string())));
        assert_eq!(example.combinations[1].facts["other"], Some(Value::String("Y".to_string())));
    }

    #[test]
    fn test_confounded_by_test_name() {
        let results = [result("1", "T1", &[("exp", "A")]), result("2", "T2", &[("exp", "A")])];

        let Dependency::Confounded(example) = check_results(&results) else {
            panic!("expected a counter-example");
        };

        let names: Vec<&str> = example.combinations.iter().map(|c| c.test_name.as_str()).collect();
        assert_eq!(names, vec!["T1", "T2"]);
    }

    #[test]
    fn test_missing_other_fact_is_a_distinct_value() {
        let results = [
            result("1", "T", &[("exp", "A"), ("other", "X")]),
            result("2", "T", &[("exp", "A")]),
        ];

        let Dependency::Confounded(example) = check_results(&results) else {
            panic!("expected a counter-example");
        };
        assert_eq!(example.combinations[1].facts["other"], None);
    }

    #[test]
    fn test_first_offending_value_is_reported() {
        let results = [
            result("1", "T", &[("exp", "C"), ("other", "X")]),
            result("2", "T", &[("exp", "C"), ("other", "Y")]),
            result("3", "T", &[("exp", "B"), ("other", "X")]),
            result("4", "T", &[("exp", "B"), ("other", "Y")]),
        ];

        let Dependency::Confounded(example) = check_results(&results) else {
            panic!("expected a counter-example");
        };
        assert_eq!(example.fact_value, Value::String("B".to_string()));
    }

    #[test]
    fn test_no_results_is_sound() {
        assert!(check_results(&[]).is_sound());
    }
}
