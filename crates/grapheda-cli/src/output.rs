//! Terminal output formatting.

use colored::Colorize;
use grapheda_core::table::pad_right;
use grapheda_core::{CatalogEntry, Table};
use grapheda_graph::GraphSummary;
use unicode_width::UnicodeWidthStr;

const GAP: usize = 2;
const MIN_COLUMN_WIDTH: usize = 8;

/// Print the analysis catalog.
pub fn print_catalog(entries: &[CatalogEntry]) {
    if entries.is_empty() {
        println!("{}", "No analyses registered.".dimmed());
        return;
    }

    let name_width = entries
        .iter()
        .map(|e| UnicodeWidthStr::width(e.name.as_str()))
        .max()
        .unwrap_or(0);

    println!("{}", "Available analyses".bold());
    println!("{}", "─".repeat(term_width().min(80)));
    for entry in entries {
        println!(
            "  {}  {}",
            pad_right(&entry.name, name_width).cyan(),
            entry.description
        );
    }
}

/// Print a result table, shrinking wide columns to fit the terminal.
pub fn print_table(table: &Table) {
    if table.is_empty() {
        println!("{}", "No results.".dimmed());
        return;
    }

    let widths = fit_widths(&table.column_widths(), term_width());

    let header: Vec<String> = table
        .headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad_right(&truncate_visual(&h.to_uppercase(), *w), *w))
        .collect();
    println!("{}", header.join(&" ".repeat(GAP)).trim_end().bold());

    let total: usize = widths.iter().sum::<usize>() + GAP * widths.len().saturating_sub(1);
    println!("{}", "─".repeat(total));

    for row in &table.rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| {
                let text = pad_right(&truncate_visual(cell, *w), *w);
                if cell == "(none)" {
                    text.dimmed().to_string()
                } else {
                    text
                }
            })
            .collect();
        println!("{}", cells.join(&" ".repeat(GAP)).trim_end());
    }

    println!();
    println!("{} row(s)", table.rows.len());
}

/// Print headline counts.
pub fn print_summary(summary: &GraphSummary) {
    println!("{}", "Graph Summary".bold());
    println!("{}", "─".repeat(40));
    println!("  Nodes:              {}", summary.nodes.to_string().cyan());
    println!("  Relationships:      {}", summary.relationships.to_string().cyan());

    let disconnected = summary.disconnected_nodes.to_string();
    let unlabeled = summary.unlabeled_nodes.to_string();
    println!(
        "  Disconnected nodes: {}",
        if summary.disconnected_nodes > 0 { disconnected.yellow() } else { disconnected.green() }
    );
    println!(
        "  Unlabeled nodes:    {}",
        if summary.unlabeled_nodes > 0 { unlabeled.yellow() } else { unlabeled.green() }
    );
    println!("{}", "─".repeat(40));
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Shrink the widest columns until the table fits in `available` columns.
fn fit_widths(natural: &[usize], available: usize) -> Vec<usize> {
    let mut widths = natural.to_vec();
    let gaps = GAP * widths.len().saturating_sub(1);

    while widths.iter().sum::<usize>() + gaps > available {
        let Some((idx, widest)) = widths.iter().copied().enumerate().max_by_key(|(_, w)| *w) else {
            break;
        };
        if widest <= MIN_COLUMN_WIDTH {
            break;
        }
        widths[idx] = widest - 1;
    }
    widths
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}
