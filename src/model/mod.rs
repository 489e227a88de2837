//! Shared vocabulary of the extraction pipeline.
//!
//! A [`Value`] is a closed tagged scalar, tagged by its [`ValueType`]. Values are
//! pulled out of [`Artifact`]s and collected, per benchmark run, into a
//! [`RunResult`] holding single-valued facts and repeated [`Metric`] samples.

mod artifact;
mod result;
mod unit;
mod value;
mod value_type;

pub use artifact::Artifact;
pub use result::{Metric, ParseDiagnostic, RESERVED_FACT_NAMES, RunResult, is_reserved_fact_name};
pub use unit::{Unit, UnitRegistry};
pub use value::Value;
pub use value_type::ValueType;
