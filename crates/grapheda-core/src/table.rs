//! Tabular rendering of analysis results.
//!
//! A pure transform over an [`AnalysisResult`]; nothing here touches the
//! database or the cache.

use std::fmt;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::result::{AnalysisResult, Value};

/// A rectangular, string-valued view of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Columns come from the first row; later rows are read by column name,
    /// so a row missing a column renders an empty cell.
    pub fn from_result(result: &AnalysisResult) -> Self {
        let headers: Vec<String> = result
            .rows
            .first()
            .map(|row| row.columns().map(str::to_string).collect())
            .unwrap_or_default();

        let rows = result
            .rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| row.get(h).map(render_cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Visual width of each column, header included.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| UnicodeWidthStr::width(cell.as_str()))
                    .chain(std::iter::once(UnicodeWidthStr::width(header.as_str())))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "(none)".to_string(),
        other => other.to_string(),
    }
}

/// Pad a string to a given visual width (right-padded).
pub fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();
        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| pad_right(cell, *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        writeln!(f, "{}", line(&self.headers))?;
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        writeln!(f, "{}", "-".repeat(total))?;
        for row in &self.rows {
            writeln!(f, "{}", line(row))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use crate::result::ResultRecord;

    fn label_counts() -> AnalysisResult {
        AnalysisResult::new(
            "node_label_counts",
            Params::new(),
            vec![
                ResultRecord::new().with("label", "Person").with("count", 12),
                ResultRecord::new().with("label", Value::Null).with("count", 3),
            ],
        )
    }

    #[test]
    fn test_from_result_keeps_order() {
        let table = Table::from_result(&label_counts());
        assert_eq!(table.headers, vec!["label", "count"]);
        assert_eq!(table.rows[0], vec!["Person", "12"]);
        assert_eq!(table.rows[1], vec!["(none)", "3"]);
    }

    #[test]
    fn test_display_aligns_columns() {
        let rendered = Table::from_result(&label_counts()).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "label   count");
        assert_eq!(lines[1], "-------------");
        assert_eq!(lines[2], "Person  12");
        assert_eq!(lines[3], "(none)  3");
    }

    #[test]
    fn test_empty_result() {
        let result = AnalysisResult::new("node_label_counts", Params::new(), Vec::new());
        let table = Table::from_result(&result);
        assert!(table.is_empty());
        assert!(table.headers.is_empty());
    }

    #[test]
    fn test_rendering_leaves_result_untouched() {
        let result = label_counts();
        let before = result.clone();
        let _ = Table::from_result(&result);
        assert_eq!(result, before);
    }
}
