//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use crate::{
    config::ValidationWarning,
    error::{AppError, Result},
    models::{Category, ConfigKey, ConfigModel, ConfigValue, SetOutcome},
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format the whole model, or a single category of it
    fn format_model(&self, model: &ConfigModel, category: Option<Category>) -> Result<String>;

    /// Format a single value for `get`
    fn format_value(&self, key: ConfigKey, value: &ConfigValue) -> Result<String>;

    /// Format the result of a `set`, given the value now stored
    fn format_set_outcome(&self, key: ConfigKey, outcome: &SetOutcome, stored: &ConfigValue) -> Result<String>;

    /// Format validation findings
    fn format_warnings(&self, warnings: &[ValidationWarning]) -> Result<String>;

    /// Format a discovery server list
    fn format_discovery(&self, label: &str, servers: &str) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Show table borders
    pub table_borders: bool,
    /// Maximum cell width
    pub max_width: usize,
    /// Hide the Wi-Fi password
    pub mask_secrets: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            max_width: 60,
            mask_secrets: false,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Show borders around table
    pub show_borders: bool,
    /// Show header row
    pub show_header: bool,
}

impl TableFormat {
    /// Two-column key/value layout used for every category
    pub fn key_value(show_borders: bool, max_width: usize) -> Self {
        Self {
            columns: vec![
                Column::new("Key", 8, 40),
                Column::new("Value", 8, max_width),
            ],
            show_borders,
            show_header: true,
        }
    }
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    /// Column header
    pub header: String,
    /// Minimum width
    pub min_width: usize,
    /// Maximum width
    pub max_width: usize,
}

impl Column {
    pub fn new(header: &str, min_width: usize, max_width: usize) -> Self {
        Self {
            header: header.to_string(),
            min_width,
            max_width,
        }
    }
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Text shown for a value, with unset fields made visible
pub fn display_value(key: ConfigKey, value: &ConfigValue, mask_secrets: bool) -> String {
    match value {
        ConfigValue::Unset => "(unset)".to_string(),
        ConfigValue::Text(_) if mask_secrets && is_secret(key) => "********".to_string(),
        other => other.to_string(),
    }
}

fn is_secret(key: ConfigKey) -> bool {
    matches!(key, ConfigKey::Wifi(crate::models::WifiKey::Password))
}

/// Rows of one category, in key order
pub fn category_rows(model: &ConfigModel, category: Category, mask_secrets: bool) -> Vec<RowData> {
    category
        .keys()
        .into_iter()
        .map(|key| vec![key.name().to_string(), display_value(key, &model.get(key), mask_secrets)])
        .collect()
}

/// Categories selected for display
pub fn selected_categories(category: Option<Category>) -> Vec<Category> {
    match category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Create a table with the given format and data
    pub fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);

        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &column_widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output.trim_end().to_string()
    }

    /// Calculate column widths from content, bounded by the column limits
    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        format
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let content = rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                content
                    .max(column.min_width)
                    .max(column.header.len())
                    .min(column.max_width)
            })
            .collect()
    }

    /// Create a table row
    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (cell, &width) in data.iter().zip(widths.iter()) {
            let padded_cell = self.align_text(cell, width);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&padded_cell);
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    /// Create horizontal border for table
    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }

    /// Left-align text within the width, truncating long values
    fn align_text(&self, text: &str, width: usize) -> String {
        let len = text.chars().count();
        if len > width {
            let keep = width.saturating_sub(3);
            return format!("{}...", text.chars().take(keep).collect::<String>());
        }
        format!("{}{}", text, " ".repeat(width - len))
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.len() + 4);

        writeln!(output, "{}", border)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", title)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", border)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_model(&self, model: &ConfigModel, category: Option<Category>) -> Result<String> {
        let format = TableFormat::key_value(self.options.table_borders, self.options.max_width);
        let sections: Vec<String> = selected_categories(category)
            .into_iter()
            .map(|category| {
                let rows = category_rows(model, category, self.options.mask_secrets);
                format!("[{}]\n{}", category, self.create_table(&format, &rows))
            })
            .collect();

        Ok(sections.join("\n\n"))
    }

    fn format_value(&self, _key: ConfigKey, value: &ConfigValue) -> Result<String> {
        Ok(value.to_string())
    }

    fn format_set_outcome(&self, key: ConfigKey, outcome: &SetOutcome, stored: &ConfigValue) -> Result<String> {
        let shown = display_value(key, stored, self.options.mask_secrets);
        Ok(match outcome {
            SetOutcome::Applied => format!("{} = {}", key, shown),
            SetOutcome::Clamped { requested, stored } => {
                format!("{} = {} (clamped from {})", key, stored, requested)
            }
            SetOutcome::Rejected(reason) => format!("{} unchanged ({}): {}", key, shown, reason),
        })
    }

    fn format_warnings(&self, warnings: &[ValidationWarning]) -> Result<String> {
        if warnings.is_empty() {
            return Ok("No issues found".to_string());
        }

        let lines: Vec<String> = warnings.iter().map(|w| w.format(false)).collect();
        Ok(lines.join("\n"))
    }

    fn format_discovery(&self, label: &str, servers: &str) -> Result<String> {
        if self.options.verbose_mode {
            Ok(format!("{}: {}", label, servers))
        } else {
            Ok(servers.to_string())
        }
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationLevel;
    use crate::models::{ExportKey, WifiKey};

    fn formatter() -> PlainFormatter {
        PlainFormatter::new(FormattingOptions {
            enable_color: false,
            ..FormattingOptions::default()
        })
    }

    #[test]
    fn test_model_table() {
        let output = formatter().format_model(&ConfigModel::default(), Some(Category::Wifi)).unwrap();

        assert!(output.starts_with("[wifi]\n+"));
        assert!(output.contains("| SSID"));
        assert!(output.contains("| Turtlebot4"));
        assert!(output.contains("(unset)"));
        assert!(!output.contains("[export]"));
    }

    #[test]
    fn test_all_categories_and_masking() {
        let formatter = PlainFormatter::new(FormattingOptions {
            enable_color: false,
            table_borders: false,
            mask_secrets: true,
            ..FormattingOptions::default()
        });
        let output = formatter.format_model(&ConfigModel::default(), None).unwrap();

        for category in Category::ALL {
            assert!(output.contains(&format!("[{}]", category)));
        }
        assert!(output.contains("********"));
        assert!(!output.contains('+'));
    }

    #[test]
    fn test_long_values_are_truncated() {
        let formatter = PlainFormatter::new(FormattingOptions {
            max_width: 10,
            ..FormattingOptions::default()
        });
        let format = TableFormat::key_value(true, 10);
        let table = formatter.create_table(&format, &[vec!["KEY".to_string(), "x".repeat(30)]]);
        assert!(table.contains("xxxxxxx..."));
    }

    #[test]
    fn test_set_outcomes() {
        let formatter = formatter();
        let key = ConfigKey::Export(ExportKey::DomainId);

        let clamped = SetOutcome::Clamped { requested: 150, stored: 101 };
        assert_eq!(
            formatter.format_set_outcome(key, &clamped, &ConfigValue::from("101")).unwrap(),
            format!("{} = 101 (clamped from 150)", key)
        );

        let key = ConfigKey::Wifi(WifiKey::Ssid);
        let rejected = SetOutcome::Rejected("cannot be empty".to_string());
        let line = formatter.format_set_outcome(key, &rejected, &ConfigValue::from("Turtlebot4")).unwrap();
        assert!(line.contains("unchanged (Turtlebot4)"));
    }

    #[test]
    fn test_warnings() {
        let formatter = formatter();
        assert_eq!(formatter.format_warnings(&[]).unwrap(), "No issues found");

        let warnings = [ValidationWarning::new(ValidationLevel::Warning, "open network".to_string())];
        assert_eq!(formatter.format_warnings(&warnings).unwrap(), "[WARNING] open network");
    }

    #[test]
    fn test_get_prints_bare_value() {
        let formatter = formatter();
        let key = ConfigKey::Wifi(WifiKey::Ip);
        assert_eq!(formatter.format_value(key, &ConfigValue::Unset).unwrap(), "");
        assert_eq!(formatter.format_value(key, &ConfigValue::from("10.0.0.2/24")).unwrap(), "10.0.0.2/24");
    }
}
