use crate::Result;
use core::fmt;
use ohno::app_err;
use serde::Serialize;

/// A measurement unit attached to a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Unit {
    pub name: &'static str,
    pub short_name: &'static str,
    pub family: &'static str,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name)
    }
}

const TIME: &str = "time";
const DATA: &str = "data";

const STANDARD_UNITS: &[Unit] = &[
    Unit {
        name: "nanoseconds",
        short_name: "ns",
        family: TIME,
    },
    Unit {
        name: "microseconds",
        short_name: "us",
        family: TIME,
    },
    Unit {
        name: "milliseconds",
        short_name: "ms",
        family: TIME,
    },
    Unit {
        name: "seconds",
        short_name: "s",
        family: TIME,
    },
    Unit {
        name: "bytes",
        short_name: "B",
        family: DATA,
    },
    Unit {
        name: "kibibytes",
        short_name: "KiB",
        family: DATA,
    },
    Unit {
        name: "mebibytes",
        short_name: "MiB",
        family: DATA,
    },
    Unit {
        name: "gibibytes",
        short_name: "GiB",
        family: DATA,
    },
];

/// Closed lookup table of the units rule files may reference.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: Vec<Unit>,
}

impl UnitRegistry {
    #[must_use]
    pub fn standard() -> Self {
        Self {
            units: STANDARD_UNITS.to_vec(),
        }
    }

    /// Resolve a unit by its short name.
    ///
    /// An empty short name means "no unit" and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the short name is not in the registry.
    pub fn lookup(&self, short_name: &str) -> Result<Option<Unit>> {
        if short_name.is_empty() {
            return Ok(None);
        }

        self.units
            .iter()
            .find(|unit| unit.short_name == short_name)
            .copied()
            .map(Some)
            .ok_or_else(|| {
                let known: Vec<_> = self.units.iter().map(|unit| unit.short_name).collect();
                app_err!("unknown unit '{short_name}' (expected one of {})", known.join(", "))
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
