//! Command-line interface for benchfacts
//!
//! The `run` function parses command-line arguments using clap and routes to
//! one handler per subcommand. Every handler writes through a [`Host`] so tests
//! can capture the output and the exit status.
//!
//! ## Commands
//!
//! - **import**: copy a run's artifacts into the database under a content-derived result ID
//! - **compare**: group results by a fact and summarize a metric per group
//! - **results** / **metrics**: list what the rules extracted
//! - **validate**: check the rule file and print the declared schema
//! - **export** / **sql**: hand the database to DuckDB
//!
//! The global `--result-db`, `--log-level` and `--color` flags live in `common`.

mod common;
mod compare;
mod export;
mod host;
mod import;
mod list;
mod run;
mod validate;

pub use common::{ColorMode, CommonArgs, LogLevel};
pub use compare::{CompareArgs, compare};
pub use export::{ExportArgs, SqlArgs, export, sql};
pub use host::Host;
pub use import::{ImportArgs, import};
pub use list::{list_metrics, list_results};
pub use run::run;
pub use validate::validate;
