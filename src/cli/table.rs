//! Table formatting utilities for CLI list commands
//!
//! Every listing builds [`TableRow`]s against a set of [`ColumnDef`]s and
//! hands them to a [`TableFormatter`], which takes care of the aligned,
//! CSV, Markdown and id-only renderings.

use chrono::NaiveDate;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::io;

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record id (cyan)
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Lifecycle state with color coding
    Status(String),
    /// Calendar date
    Date(NaiveDate),
    /// Money, two decimals, right aligned
    Money(f64),
    /// Whole number, right aligned
    Number(i64),
    /// Yes/no flag
    Flag(bool),
    /// List of ids
    Tags(Vec<String>),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Reference to another record, `-` when absent
    pub fn optional_id(id: Option<&str>) -> Self {
        id.map_or(CellValue::Empty, |id| CellValue::Id(id.to_string()))
    }

    /// Format for aligned output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                format!("{:<width$}", truncate_str(s, width.saturating_sub(2)), width = width)
            }
            CellValue::Status(s) => {
                let styled = match s.to_uppercase().as_str() {
                    "ACTIVE" | "AVAILABLE" | "OPEN" => style(s).green(),
                    "IN_USE" | "BORROWED" | "SUSPENDED" => style(s).yellow(),
                    "MAINTENANCE" | "OVERDUE" => style(s).red(),
                    "COMPLETED" | "RETURNED" | "RETIRED" => style(s).dim(),
                    _ => style(s).white(),
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Date(d) => format!("{:<width$}", d.format("%Y-%m-%d"), width = width),
            CellValue::Money(m) => format!("{:>width$.2}", m, width = width),
            CellValue::Number(n) => format!("{:>width$}", n, width = width),
            CellValue::Flag(b) => {
                let styled = if *b { style("yes").green() } else { style("no").dim() };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Tags(tags) => {
                let joined = if tags.is_empty() { "-".to_string() } else { tags.join(",") };
                format!("{:<width$}", truncate_str(&joined, width.saturating_sub(2)), width = width)
            }
            CellValue::Empty => format!("{:<width$}", style("-").dim(), width = width),
        }
    }

    /// Format for Markdown output (no colors, escaped pipes)
    pub fn format_md(&self) -> String {
        let raw = match self {
            CellValue::Flag(true) => "**yes**".to_string(),
            CellValue::Empty => "-".to_string(),
            other => other.raw(),
        };
        raw.replace('|', "\\|")
    }

    /// Get raw string value (no formatting, for CSV and ID output)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) | CellValue::Status(s) => s.clone(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Money(m) => format!("{:.2}", m),
            CellValue::Number(n) => n.to_string(),
            CellValue::Flag(b) => (if *b { "yes" } else { "no" }).to_string(),
            CellValue::Tags(tags) => tags.join(","),
            CellValue::Empty => String::new(),
        }
    }

    /// Width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        match self {
            CellValue::Flag(_) => 3,
            CellValue::Date(_) => 10,
            CellValue::Empty => 1,
            other => other.raw().chars().count(),
        }
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Drop the "N record(s) found" line
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat) -> Result<()>
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows)?,
            OutputFormat::Md => self.output_md(&rows),
            OutputFormat::Id => self.output_ids(&rows),
            _ => self.output_tsv(&rows),
        }
        Ok(())
    }

    /// Calculate dynamic column widths based on actual content
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(CellValue::display_width)
                    .max()
                    .unwrap_or(0);
                // Text truncation keeps a two character margin
                col.header.len().max(max_content + 2).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        if rows.is_empty() {
            if self.show_summary {
                println!("No {}s found.", self.entity_name);
            }
            return;
        }

        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = w),
                })
                .collect();
            println!("{}", parts.join(" ").trim_end());
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(io::stdout());
        writer
            .write_record(self.columns.iter().map(|c| c.key))
            .into_diagnostic()?;
        for row in rows {
            writer
                .write_record(
                    self.columns
                        .iter()
                        .map(|col| row.get(col.key).map(CellValue::raw).unwrap_or_default()),
                )
                .into_diagnostic()?;
        }
        writer.flush().into_diagnostic()?;
        Ok(())
    }

    fn output_md(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        println!("| {} |", headers.join(" | "));

        let separators: Vec<&str> = headers.iter().map(|_| "---").collect();
        println!("|{}|", separators.join("|"));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map_or_else(|| "-".to_string(), CellValue::format_md))
                .collect();
            println!("| {} |", values.join(" | "));
        }
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for row in rows {
            println!("{}", row.id);
        }
    }
}

/// Print `label: value` lines for a single record
pub fn print_fields(title: &str, fields: &[(&str, String)]) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style(title).bold());
    println!("{}", style("─".repeat(60)).dim());
    let label_width = fields.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (label, value) in fields {
        let shown = if value.is_empty() { "-" } else { value.as_str() };
        println!(
            "{:<width$}  {}",
            style(label).bold(),
            shown,
            width = label_width
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_text_format() {
        let cell = CellValue::Text("Hello World".to_string());
        assert!(cell.format_tsv(20).contains("Hello World"));
        assert_eq!(cell.raw(), "Hello World");
        assert_eq!(cell.format_md(), "Hello World");
    }

    #[test]
    fn test_cell_value_money_and_dates() {
        assert_eq!(CellValue::Money(12.0).raw(), "12.00");
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(CellValue::Date(date).raw(), "2024-03-05");
        assert_eq!(CellValue::Date(date).display_width(), 10);
    }

    #[test]
    fn test_cell_value_tags() {
        let cell = CellValue::Tags(vec!["E001".to_string(), "E002".to_string()]);
        assert_eq!(cell.raw(), "E001,E002");
        assert_eq!(cell.display_width(), 9);
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        let cell = CellValue::Text("a|b|c".to_string());
        assert_eq!(cell.format_md(), "a\\|b\\|c");
        assert_eq!(CellValue::Flag(true).format_md(), "**yes**");
        assert_eq!(CellValue::optional_id(None).format_md(), "-");
    }

    #[test]
    fn test_table_row_builder() {
        let row = TableRow::new("E010")
            .cell("name", CellValue::Text("Data Server".to_string()))
            .cell("status", CellValue::Status("AVAILABLE".to_string()));

        assert_eq!(row.id, "E010");
        assert!(row.get("name").is_some());
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_widths_fit_content_within_limits() {
        const COLUMNS: &[ColumnDef] = &[
            ColumnDef::new("id", "ID", 10),
            ColumnDef::new("name", "NAME", 12),
        ];
        let rows = vec![TableRow::new("M001")
            .cell("id", CellValue::Id("M001".to_string()))
            .cell("name", CellValue::Text("A very long media title".to_string()))];
        let widths = TableFormatter::new(COLUMNS, "item").calculate_widths(&rows);
        assert_eq!(widths, vec![6, 12]);
    }
}
