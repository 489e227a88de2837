use super::Host;
use super::common::{CommonArgs, fail};
use crate::Result;
use crate::db::Schema;
use crate::reports::generate_schema;
use crate::rules::RuleSet;
use std::io::Write;

/// Check the rule file of the database and describe the schema it declares
pub fn validate<H: Host>(host: &mut H, common: &CommonArgs) -> Result<()> {
    let options = common.load_options();
    let path = common.result_db.join(&options.rules_file_name);

    let checked = RuleSet::load(&path, &options.units).and_then(|rules| Ok((Schema::infer(&rules)?, rules.len())));
    match checked {
        Ok((schema, rule_count)) => {
            let mut report = String::new();
            generate_schema(&schema, common.color.use_colors(), &mut report)?;

            let _ = writeln!(host.output(), "Rule file '{path}' is valid ({rule_count} rules)\n\n{report}");
            Ok(())
        }
        Err(e) => fail(host, "Rule file validation", e),
    }
}
