use super::Host;
use super::common::{CommonArgs, fail, open_database};
use crate::Result;
use crate::reports::{generate_metrics, generate_results};
use std::io::Write;

/// List every result with its facts
pub async fn list_results<H: Host>(host: &mut H, common: &CommonArgs) -> Result<()> {
    let db = match open_database(host, common).await {
        Ok(db) => db,
        Err(e) => return fail(host, "Loading the database", e),
    };

    let mut report = String::new();
    generate_results(&db, common.color.use_colors(), &mut report)?;
    let _ = write!(host.output(), "{report}");
    Ok(())
}

/// List every metric sample of every result
pub async fn list_metrics<H: Host>(host: &mut H, common: &CommonArgs) -> Result<()> {
    let db = match open_database(host, common).await {
        Ok(db) => db,
        Err(e) => return fail(host, "Loading the database", e),
    };

    let mut report = String::new();
    generate_metrics(&db, common.color.use_colors(), &mut report)?;
    let _ = write!(host.output(), "{report}");
    Ok(())
}
