//! Human-readable table output
//!
//! Consecutive findings sharing a rule-set label form one section. Column
//! widths are computed per section. Report order puts every removal before
//! any deprecation, so one label can come back after another; its later
//! sections are headed as continuations.

use console::style;
use std::collections::HashSet;
use std::io::Write;

use super::FindingRecord;
use crate::error::Result;

const RULE_WIDTH: usize = 90;

const HEADERS: [&str; 6] = [
    "KIND",
    "NAMESPACE",
    "NAME",
    "API_VERSION",
    "REPLACE_WITH (SINCE)",
    "SOURCE",
];

pub fn write<W: Write>(
    records: &[FindingRecord],
    with_labels: bool,
    color: bool,
    mut w: W,
) -> Result<()> {
    let mut seen = HashSet::new();
    for section in records.chunk_by(|a, b| a.rule_set == b.rule_set) {
        let label = section[0].rule_set.as_str();
        let header = if seen.insert(label) {
            format!(">>> {} <<<", label)
        } else {
            format!(">>> {} (continued) <<<", label)
        };

        writeln!(w, "{}", "_".repeat(RULE_WIDTH))?;
        writeln!(w, "{}", style(header).bold().force_styling(color))?;
        writeln!(w, "{}", "-".repeat(RULE_WIDTH))?;

        let mut headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        if with_labels {
            headers.push("LABELS".to_string());
        }
        let rows: Vec<Vec<String>> = section.iter().map(|r| row(r, with_labels)).collect();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header_line = pad(&headers, &widths);
        writeln!(w, "{}", style(header_line).bold().force_styling(color))?;
        for row in &rows {
            writeln!(w, "{}", pad(row, &widths))?;
        }
    }

    w.flush()?;
    Ok(())
}

fn row(record: &FindingRecord, with_labels: bool) -> Vec<String> {
    let mut cells = vec![
        record.kind.clone(),
        record.namespace.clone(),
        record.name.clone(),
        record.api_version.clone(),
        format!("{} ({})", record.replace_with, record.since),
        record.source.clone(),
    ];
    if with_labels {
        cells.push(record.labels_column());
    }
    cells
}

fn pad(cells: &[String], widths: &[usize]) -> String {
    let last = cells.len().saturating_sub(1);
    cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, width))| {
            if i == last {
                cell.clone()
            } else {
                format!("{:<width$}", cell, width = width)
            }
        })
        .collect::<Vec<_>>()
        .join("   ")
}
