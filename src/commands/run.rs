//! Command dispatch logic for benchfacts

use super::common::{CommonArgs, init_logging};
use super::{CompareArgs, ExportArgs, ImportArgs, SqlArgs, compare, export, import, list_metrics, list_results, sql, validate};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "benchfacts", version, author, long_about = None)]
#[command(about = "Extract facts and metrics from benchmark artifacts and compare them")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: BenchfactsSubcommand,
}

#[derive(Subcommand, Debug)]
enum BenchfactsSubcommand {
    /// Import a benchmark run's artifacts as a new result
    Import(ImportArgs),
    /// Compare a metric across the values of a fact
    Compare(CompareArgs),
    /// List results with their facts
    Results,
    /// List every metric sample
    Metrics,
    /// Check the rule file and show the schema it declares
    Validate,
    /// Export the database for querying with DuckDB
    Export(ExportArgs),
    /// Open a DuckDB session over the exported database
    Sql(SqlArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.common.log_level);

    match &cli.command {
        BenchfactsSubcommand::Import(import_args) => import(host, &cli.common, import_args),
        BenchfactsSubcommand::Compare(compare_args) => compare(host, &cli.common, compare_args).await,
        BenchfactsSubcommand::Results => list_results(host, &cli.common).await,
        BenchfactsSubcommand::Metrics => list_metrics(host, &cli.common).await,
        BenchfactsSubcommand::Validate => validate(host, &cli.common),
        BenchfactsSubcommand::Export(export_args) => export(host, &cli.common, export_args).await,
        BenchfactsSubcommand::Sql(sql_args) => sql(host, &cli.common, sql_args).await,
    }
}
