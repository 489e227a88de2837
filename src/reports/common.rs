//! Formatting shared by the report generators.

use crate::model::{Unit, Value};

/// Placeholder for a fact a result doesn't have.
pub const MISSING: &str = "-";

/// Format a statistic with a fixed precision, dropping the fraction for whole numbers.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Float(f) => format_number(*f),
        other => other.to_string(),
    }
}

pub fn format_optional_value(value: Option<&Value>) -> String {
    value.map_or_else(|| MISSING.to_string(), format_value)
}

/// A column heading with the unit appended when there is one.
pub fn with_unit(heading: &str, unit: Option<Unit>) -> String {
    unit.map_or_else(|| heading.to_string(), |u| format!("{heading} ({u})"))
}

/// Rows of cells, after an optional header, laid out in left-aligned columns separated by two spaces.
///
/// Widths are measured in characters so that block glyphs line up.
pub fn layout_table(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let header = (!header.is_empty()).then_some(header);
    header
        .into_iter()
        .chain(rows.iter().map(Vec::as_slice))
        .map(|cells| {
            let line = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            line.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UnitRegistry;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(20.0), "20");
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(1.2345), "1.23");
        assert_eq!(format_number(99.999), "100.00");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::Int(42)), "42");
        assert_eq!(format_value(&Value::Float(0.5)), "0.50");
        assert_eq!(format_value(&Value::String("6.1".to_string())), "6.1");
        assert_eq!(format_value(&Value::Bool(true)), "true");
        assert_eq!(format_optional_value(None), "-");
    }

    #[test]
    fn test_with_unit() {
        let ms = UnitRegistry::standard().lookup("ms").unwrap();
        assert_eq!(with_unit("mean", ms), "mean (ms)");
        assert_eq!(with_unit("mean", None), "mean");
    }

    #[test]
    fn test_layout_table() {
        let header = vec!["name".to_string(), "plot".to_string()];
        let rows = vec![
            vec!["a".to_string(), "█▂".to_string()],
            vec!["longer".to_string(), "▂".to_string()],
        ];

        assert_eq!(layout_table(&header, &rows), vec!["name    plot", "a       █▂", "longer  ▂"]);
        assert_eq!(layout_table(&[], &rows), vec!["a       █▂", "longer  ▂"]);
    }
}
