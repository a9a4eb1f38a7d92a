//! Plain-text tables for the diagnostic commands.

use std::fmt::Write as _;

/// Renders left-aligned columns separated by two spaces, with a dashed rule
/// under the header. Line breaks and tabs inside cells are flattened.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| flatten(cell)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(3)).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    for line in [&header_cells, &rule].into_iter().chain(cells.iter()) {
        let _ = writeln!(output, "{}", format_line(line, &widths));
    }
    output
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn flatten(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}
