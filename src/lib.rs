//! Core library for benchfacts
//!
//! benchfacts turns the raw artifacts of benchmark runs into typed facts and
//! metrics, then compares metric distributions across the values of a fact
//! after checking that the comparison isn't confounded by other facts.
//!
//! # Module Organization
//!
//! - [`model`]: values, units, artifacts and results
//! - [`extract`]: the extractors that pull raw values out of artifacts
//! - [`rules`]: parsers and the rule file that configures them
//! - [`db`]: assembling, importing and exporting result databases
//! - [`analysis`]: filtering, the functional-dependency check, grouping and histograms
//! - [`reports`]: terminal rendering
//! - [`commands`]: command-line interface and orchestration

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod analysis;
pub mod commands;
pub mod db;
pub mod extract;
pub mod model;
pub mod reports;
pub mod rules;

pub use crate::commands::{Host, run};
