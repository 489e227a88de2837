//! Terminal rendering of databases and comparisons.
//!
//! Every generator writes plain text into a [`core::fmt::Write`] sink and only
//! emits ANSI styling when asked to, so callers decide about color and tests can
//! compare the output directly.

mod common;
mod console;

pub use console::{comparison as generate_comparison, diagnostics as generate_diagnostics, metrics as generate_metrics};
pub use console::{results as generate_results, schema as generate_schema};
