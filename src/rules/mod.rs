//! Extraction rules.
//!
//! A [`Parser`] binds an artifact name filter and a [`ParserTarget`] to an
//! [`Extractor`](crate::extract::Extractor). The [`RuleSet`] holds every parser
//! declared in a database's rule file.

mod config;
mod parser;
mod target;

pub use config::{RULES_FILE_NAME, RuleSet, parser_from_config};
pub use parser::{ParseOutput, Parser};
pub use target::{ParserTarget, TargetKind};
