//! Comparison of metric distributions across the values of a fact.
//!
//! [`compare`] selects results with a [`ResultFilter`], verifies that the
//! grouping fact isn't confounded by any other fact, and then summarizes the
//! metric for every group with pooled statistics and a [`Histogram`].

mod filter;
pub mod functional_dependency;
mod grouping;
mod histogram;

pub use filter::{MATCH_ALL, ResultFilter};
pub use functional_dependency::{Combination, CounterExample, Dependency};
pub use grouping::{CompareRequest, Comparison, GroupStats, compare};
pub use histogram::{DEFAULT_BINS, Histogram, HistogramBin, default_range};

const LOG_TARGET: &str = "  analysis";
