use super::Host;
use super::common::{CommonArgs, fail, open_database};
use crate::Result;
use crate::db::store;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ohno::{IntoAppError, app_err};
use std::io::Write;
use std::process::Command;

const DEFAULT_STORE_DIR: &str = "benchfacts-store";

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Directory receiving the row files and the schema script
    #[arg(long, value_name = "DIR", default_value = DEFAULT_STORE_DIR)]
    pub out: Utf8PathBuf,
}

#[derive(Parser, Debug)]
pub struct SqlArgs {
    /// Directory receiving the row files and the schema script
    #[arg(long, value_name = "DIR", default_value = DEFAULT_STORE_DIR)]
    pub out: Utf8PathBuf,

    /// DuckDB CLI executable, looked up in $PATH
    #[arg(long, value_name = "PATH", default_value = "duckdb")]
    pub duckdb_cli: String,
}

/// Write the database as `results` and `metrics` tables that DuckDB can load
pub async fn export<H: Host>(host: &mut H, common: &CommonArgs, args: &ExportArgs) -> Result<()> {
    let files = match export_inner(host, common, &args.out).await {
        Ok(files) => files,
        Err(e) => return fail(host, "Export", e),
    };

    let _ = writeln!(
        host.output(),
        "Wrote '{}' and '{}'\nLoad them with: duckdb -init '{}'",
        files.results,
        files.metrics,
        files.schema
    );
    Ok(())
}

/// Export the database, then start an interactive DuckDB session with the tables loaded
pub async fn sql<H: Host>(host: &mut H, common: &CommonArgs, args: &SqlArgs) -> Result<()> {
    let files = match export_inner(host, common, &args.out).await {
        Ok(files) => files,
        Err(e) => return fail(host, "Export", e),
    };

    let status = Command::new(&args.duckdb_cli)
        .arg("-init")
        .arg(files.schema.as_str())
        .status()
        .into_app_err_with(|| format!("starting the DuckDB CLI '{}'", args.duckdb_cli));

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            let code = status.code().unwrap_or(1);
            fail(host, "DuckDB session", app_err!("'{}' exited with status {code}", args.duckdb_cli))
        }
        Err(e) => fail(host, "DuckDB session", e),
    }
}

async fn export_inner<H: Host>(host: &mut H, common: &CommonArgs, out: &Utf8Path) -> Result<store::StoreFiles> {
    let db = open_database(host, common).await?;
    store::export(&db, out)
}
