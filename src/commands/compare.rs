use super::Host;
use super::common::{CommonArgs, fail, open_database};
use crate::Result;
use crate::analysis::{CompareRequest, Comparison, DEFAULT_BINS, compare as compare_groups};
use crate::reports::generate_comparison;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct CompareArgs {
    /// Fact whose values define the groups
    #[arg(long, value_name = "FACT")]
    pub fact: String,

    /// Numeric metric to summarize for each group
    #[arg(long, value_name = "METRIC")]
    pub metric: String,

    /// CEL expression selecting the results to compare, e.g. "kernel == '6.1' && threads > 4"
    #[arg(long, value_name = "EXPR")]
    pub filter: Option<String>,

    /// Number of histogram bins per group
    #[arg(long, value_name = "N", default_value_t = DEFAULT_BINS)]
    pub bins: usize,
}

/// Compare a metric across the values of a fact
///
/// Exits with status 1 when the fact doesn't determine the other facts of the
/// selected results, after printing the counter-example.
pub async fn compare<H: Host>(host: &mut H, common: &CommonArgs, args: &CompareArgs) -> Result<()> {
    let db = match open_database(host, common).await {
        Ok(db) => db,
        Err(e) => return fail(host, "Loading the database", e),
    };

    let request = CompareRequest {
        fact: args.fact.clone(),
        metric: args.metric.clone(),
        filter: args.filter.clone(),
        bins: args.bins,
    };

    let comparison = match compare_groups(&db, &request) {
        Ok(comparison) => comparison,
        Err(e) => return fail(host, "Comparison", e),
    };

    let unit = db.metric_types().get(&request.metric).and_then(|m| m.unit);
    let mut report = String::new();
    generate_comparison(&request, &comparison, unit, common.color.use_colors(), &mut report)?;
    let _ = write!(host.output(), "{report}");

    if matches!(comparison, Comparison::Confounded(_)) {
        host.exit(1);
    }

    Ok(())
}
