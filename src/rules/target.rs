use crate::model::{Unit, ValueType};
use core::fmt;
use strum::{Display, IntoStaticStr};

/// Whether a rule produces a fact or metric samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum TargetKind {
    Fact,
    Metric,
}

/// What a rule contributes to a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserTarget {
    pub name: String,
    pub kind: TargetKind,
    pub value_type: ValueType,
    pub unit: Option<Unit>,
}

impl ParserTarget {
    #[must_use]
    pub const fn fact(name: String, value_type: ValueType) -> Self {
        Self {
            name,
            kind: TargetKind::Fact,
            value_type,
            unit: None,
        }
    }

    #[must_use]
    pub const fn metric(name: String, value_type: ValueType, unit: Option<Unit>) -> Self {
        Self {
            name,
            kind: TargetKind::Metric,
            value_type,
            unit,
        }
    }
}

impl fmt::Display for ParserTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' ({}", self.kind, self.name, self.value_type)?;
        if let Some(unit) = &self.unit {
            write!(f, ", {unit}")?;
        }
        f.write_str(")")
    }
}
