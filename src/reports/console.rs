use super::common::{MISSING, format_number, format_optional_value, format_value, layout_table, with_unit};
use crate::Result;
use crate::analysis::{CompareRequest, Comparison, CounterExample, GroupStats};
use crate::db::{Database, Schema};
use crate::model::Unit;
use core::fmt::Write;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

/// Render the outcome of a comparison: a table with one row per group, or the
/// counter-example that prevented grouping.
pub fn comparison<W: Write>(
    request: &CompareRequest,
    comparison: &Comparison,
    unit: Option<Unit>,
    use_colors: bool,
    writer: &mut W,
) -> Result<()> {
    match comparison {
        Comparison::Groups(groups) => group_table(request, groups, unit, use_colors, writer),
        Comparison::Confounded(example) => counter_example(request, example, use_colors, writer),
    }
}

fn group_table<W: Write>(request: &CompareRequest, groups: &[GroupStats], unit: Option<Unit>, use_colors: bool, writer: &mut W) -> Result<()> {
    let header: Vec<String> = [request.fact.as_str(), "test", "results", "samples"]
        .iter()
        .map(ToString::to_string)
        .chain(["mean", "min", "max", "stddev"].iter().map(|h| with_unit(h, unit)))
        .chain(core::iter::once("histogram".to_string()))
        .collect();

    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|group| {
            vec![
                format_value(&group.fact_value),
                group.test_name.clone(),
                group.results.to_string(),
                group.count.to_string(),
                format_number(group.mean),
                format_number(group.min),
                format_number(group.max),
                group.std_dev.map_or_else(|| MISSING.to_string(), format_number),
                group.histogram.plot_unicode(),
            ]
        })
        .collect();

    let title = format!("{} by {}", request.metric, request.fact);
    write_heading(writer, &title, use_colors)?;
    write_table(writer, &header, &rows, use_colors)?;

    if let Some(group) = groups.first() {
        let (lo, hi) = group.histogram.range();
        writeln!(writer)?;
        writeln!(
            writer,
            "Histograms have {} bins from {} to {}",
            group.histogram.bins().len(),
            format_number(lo),
            format_number(hi)
        )?;
    }

    Ok(())
}

fn counter_example<W: Write>(request: &CompareRequest, example: &CounterExample, use_colors: bool, writer: &mut W) -> Result<()> {
    let verdict = format!(
        "Cannot compare '{}' by '{}': {} = {} does not determine the other facts",
        request.metric,
        example.fact,
        example.fact,
        format_value(&example.fact_value)
    );
    if use_colors {
        writeln!(writer, "{}", verdict.red().bold())?;
    } else {
        writeln!(writer, "{verdict}")?;
    }

    writeln!(
        writer,
        "Results with {} = {} come in {} different combinations:",
        example.fact,
        format_value(&example.fact_value),
        example.combinations.len()
    )?;
    writeln!(writer)?;

    let fact_names: Vec<&String> = example.combinations.first().map(|c| c.facts.keys().collect()).unwrap_or_default();
    let header: Vec<String> = core::iter::once("test".to_string()).chain(fact_names.iter().map(|n| (*n).clone())).collect();
    let rows: Vec<Vec<String>> = example
        .combinations
        .iter()
        .map(|combination| {
            core::iter::once(combination.test_name.clone())
                .chain(combination.facts.values().map(|v| format_optional_value(v.as_ref())))
                .collect()
        })
        .collect();

    write_table(writer, &header, &rows, use_colors)?;
    writeln!(writer)?;
    writeln!(writer, "Use a filter to hold the other facts constant.")?;
    Ok(())
}

/// List every result with the facts it carries.
pub fn results<W: Write>(db: &Database, use_colors: bool, writer: &mut W) -> Result<()> {
    let width = terminal_width();

    for result in db.results() {
        let name = format!("{}:{}", result.test_name, result.result_id);
        if use_colors {
            writeln!(writer, "{}", name.bold())?;
        } else {
            writeln!(writer, "{name}")?;
        }

        let facts = result
            .facts
            .iter()
            .map(|(name, value)| format!("{name}={}", format_value(value)))
            .collect::<Vec<_>>()
            .join(" ");

        if facts.is_empty() {
            writeln!(writer, "  (no facts)")?;
        } else {
            for line in wrap_text(&facts, width, 2) {
                writeln!(writer, "  {line}")?;
            }
        }
    }

    Ok(())
}

/// List every metric sample, one per line.
pub fn metrics<W: Write>(db: &Database, use_colors: bool, writer: &mut W) -> Result<()> {
    let header: Vec<String> = ["result", "metric", "value", "unit"].iter().map(ToString::to_string).collect();
    let rows: Vec<Vec<String>> = db
        .results()
        .flat_map(|result| {
            result.metrics.iter().map(|metric| {
                vec![
                    result.result_id.clone(),
                    metric.name.clone(),
                    format_value(&metric.value),
                    metric.unit.map_or_else(String::new, |u| u.to_string()),
                ]
            })
        })
        .collect();

    write_table(writer, &header, &rows, use_colors)
}

/// Describe the facts and metrics the rules declare.
pub fn schema<W: Write>(schema: &Schema, use_colors: bool, writer: &mut W) -> Result<()> {
    write_heading(writer, "Facts", use_colors)?;
    if schema.facts.is_empty() {
        writeln!(writer, "  (none)")?;
    }
    let facts: Vec<Vec<String>> = schema
        .facts
        .iter()
        .map(|(name, value_type)| vec![name.clone(), value_type.to_string()])
        .collect();
    for line in layout_table(&[], &facts) {
        writeln!(writer, "  {line}")?;
    }

    writeln!(writer)?;
    write_heading(writer, "Metrics", use_colors)?;
    if schema.metrics.is_empty() {
        writeln!(writer, "  (none)")?;
    }
    let metrics: Vec<Vec<String>> = schema
        .metrics
        .iter()
        .map(|(name, metric)| {
            vec![
                name.clone(),
                metric.value_type.to_string(),
                metric.unit.map_or_else(String::new, |u| u.to_string()),
            ]
        })
        .collect();
    for line in layout_table(&[], &metrics) {
        writeln!(writer, "  {line}")?;
    }

    Ok(())
}

/// Summarize the artifacts that rules could not parse. Writes nothing when there are none.
pub fn diagnostics<W: Write>(db: &Database, use_colors: bool, writer: &mut W) -> Result<()> {
    let diagnostics: Vec<_> = db.diagnostics().collect();
    if diagnostics.is_empty() {
        return Ok(());
    }

    let summary = format!("{} artifact(s) could not be parsed:", diagnostics.len());
    if use_colors {
        writeln!(writer, "{}", summary.yellow())?;
    } else {
        writeln!(writer, "{summary}")?;
    }

    for (result, diagnostic) in diagnostics {
        writeln!(
            writer,
            "  {}:{} {} (rule '{}'): {}",
            result.test_name, result.result_id, diagnostic.artifact, diagnostic.rule, diagnostic.message
        )?;
    }

    Ok(())
}

fn write_heading<W: Write>(writer: &mut W, text: &str, use_colors: bool) -> Result<()> {
    if use_colors {
        writeln!(writer, "{}", text.bold())?;
    } else {
        writeln!(writer, "{text}")?;
    }
    Ok(())
}

fn write_table<W: Write>(writer: &mut W, header: &[String], rows: &[Vec<String>], use_colors: bool) -> Result<()> {
    let mut lines = layout_table(header, rows).into_iter();

    if let Some(first) = lines.next() {
        if use_colors {
            writeln!(writer, "{}", first.bold())?;
        } else {
            writeln!(writer, "{first}")?;
        }
    }

    for line in lines {
        writeln!(writer, "{line}")?;
    }

    Ok(())
}

/// Get the terminal width, defaulting to 80 if not detectable
fn terminal_width() -> usize {
    terminal_size().map_or(80, |(Width(w), _)| usize::from(w))
}

/// Word-wrap text to fit within a given width, accounting for an indent on every line
fn wrap_text(text: &str, width: usize, indent: usize) -> Vec<String> {
    let available = width.saturating_sub(indent);
    if available == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > available {
            lines.push(core::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}
