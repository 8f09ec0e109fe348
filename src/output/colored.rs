//! Colored formatter implementation with terminal color support

use super::formatter::{
    category_rows, display_value, selected_categories, FormattingOptions, OutputFormatter,
};
use crate::{
    config::{ValidationLevel, ValidationWarning},
    error::{AppError, Result},
    models::{Category, ConfigKey, ConfigModel, ConfigValue, SetOutcome},
};
use colored::*;
use std::fmt::Write as _;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub key: Color,
    pub muted: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            key: Color::Magenta,
            muted: Color::BrightBlack,
            border: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    /// Apply bold plus color if colors are enabled
    fn emphasize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.bold().color(color)
        } else {
            text.normal()
        }
    }

    /// Create a colored section header
    fn create_section_header(&self, title: &str) -> String {
        format!("{} {}", self.colorize("▸", self.color_scheme.border), self.emphasize(title, self.color_scheme.header))
    }

    fn format_category(&self, model: &ConfigModel, category: Category) -> Result<String> {
        let mut output = String::new();
        let rows = category_rows(model, category, self.options.mask_secrets);
        let width = rows.iter().map(|row| row[0].len()).max().unwrap_or(0);

        writeln!(output, "{}", self.create_section_header(category.as_str()))
            .map_err(|e| AppError::io(format!("Failed to format model: {}", e)))?;

        for row in &rows {
            let value = if row[1] == "(unset)" {
                self.colorize(&row[1], self.color_scheme.muted)
            } else {
                self.colorize(&row[1], self.color_scheme.info)
            };
            writeln!(
                output,
                "  {}  {}",
                self.colorize(&format!("{:<width$}", row[0], width = width), self.color_scheme.key),
                value
            )
            .map_err(|e| AppError::io(format!("Failed to format model: {}", e)))?;
        }

        Ok(output.trim_end().to_string())
    }

    fn level_color(&self, level: ValidationLevel) -> Color {
        match level {
            ValidationLevel::Info => self.color_scheme.info,
            ValidationLevel::Warning => self.color_scheme.warning,
            ValidationLevel::Error => self.color_scheme.error,
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "═".repeat(title.chars().count() + 4);

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "  {}  ", self.emphasize(title, self.color_scheme.header))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        write!(output, "{}", self.colorize(&border, self.color_scheme.border))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        Ok(output)
    }

    fn format_model(&self, model: &ConfigModel, category: Option<Category>) -> Result<String> {
        let sections = selected_categories(category)
            .into_iter()
            .map(|category| self.format_category(model, category))
            .collect::<Result<Vec<_>>>()?;

        Ok(sections.join("\n\n"))
    }

    fn format_value(&self, _key: ConfigKey, value: &ConfigValue) -> Result<String> {
        Ok(value.to_string())
    }

    fn format_set_outcome(&self, key: ConfigKey, outcome: &SetOutcome, stored: &ConfigValue) -> Result<String> {
        let key_text = self.colorize(&key.to_string(), self.color_scheme.key);
        let shown = display_value(key, stored, self.options.mask_secrets);

        Ok(match outcome {
            SetOutcome::Applied => format!(
                "{} {} = {}",
                self.colorize("✓", self.color_scheme.success),
                key_text,
                self.colorize(&shown, self.color_scheme.info)
            ),
            SetOutcome::Clamped { requested, stored } => format!(
                "{} {} = {} {}",
                self.colorize("!", self.color_scheme.warning),
                key_text,
                self.colorize(&stored.to_string(), self.color_scheme.info),
                self.colorize(&format!("(clamped from {})", requested), self.color_scheme.warning)
            ),
            SetOutcome::Rejected(reason) => format!(
                "{} {} unchanged ({}): {}",
                self.colorize("✗", self.color_scheme.error),
                key_text,
                shown,
                self.colorize(reason, self.color_scheme.error)
            ),
        })
    }

    fn format_warnings(&self, warnings: &[ValidationWarning]) -> Result<String> {
        if warnings.is_empty() {
            return Ok(format!(
                "{} {}",
                self.colorize("✓", self.color_scheme.success),
                self.colorize("No issues found", self.color_scheme.success)
            ));
        }

        let lines: Vec<String> = warnings
            .iter()
            .map(|warning| {
                format!(
                    "{} {}",
                    self.emphasize(&format!("[{}]", warning.level.as_str()), self.level_color(warning.level)),
                    warning.message
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn format_discovery(&self, label: &str, servers: &str) -> Result<String> {
        if self.options.verbose_mode {
            Ok(format!("{}: {}", self.colorize(label, self.color_scheme.key), servers))
        } else {
            Ok(servers.to_string())
        }
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("✗", self.color_scheme.error), self.colorize(error, self.color_scheme.error)))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("!", self.color_scheme.warning), self.colorize(warning, self.color_scheme.warning)))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("✓", self.color_scheme.success), self.colorize(message, self.color_scheme.success)))
    }
}
