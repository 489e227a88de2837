//! Loading result databases.
//!
//! A database root holds a rule file and one directory per benchmark run, named
//! `$test_name:$result_id`, each with an `artifacts/` tree. [`read_result`] turns one
//! run directory into a [`RunResult`](crate::model::RunResult), and
//! [`Database::load`] does so for every run directory after checking that the
//! rules agree on the type of every fact and metric. The [`store`] module exports
//! a loaded database for querying with SQL, and [`import_result`] adds a new run
//! directory from a set of artifact files.

mod database;
mod importer;
mod result_reader;
pub mod store;

const LOG_TARGET: &str = "  database";

pub use database::{Database, LoadOptions, MetricSchema, Schema};
pub use importer::{ImportedResult, import_result};
pub use result_reader::{ARTIFACTS_DIR, parse_result_name, read_result};
