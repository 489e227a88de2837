use super::Host;
use super::common::{CommonArgs, fail};
use crate::Result;
use crate::db::import_result;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Name of the test that produced the artifacts
    #[arg(long, short = 't', value_name = "NAME")]
    pub test_name: String,

    /// Files to import under their own name, or directories to import recursively
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<Utf8PathBuf>,
}

/// Copy a run's artifacts into the database as a new result
pub fn import<H: Host>(host: &mut H, common: &CommonArgs, args: &ImportArgs) -> Result<()> {
    match import_result(&common.result_db, &args.test_name, &args.paths) {
        Ok(imported) => {
            let _ = writeln!(
                host.output(),
                "Imported {} artifacts as result '{}' in '{}'",
                imported.artifacts,
                imported.result_id,
                imported.result_dir
            );
            Ok(())
        }
        Err(e) => fail(host, "Import", e),
    }
}
