//! Output formatting and display system
//!
//! Formatters render the configuration model, single values, edit results
//! and validation findings. Plain and colored formatters produce tables for
//! people; the JSON formatter produces one document per call for scripts.

mod colored;
mod formatter;
mod json;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{
    Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData, TableFormat,
};
pub use json::JsonFormatter;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..FormattingOptions::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a JSON formatter
    pub fn create_json_formatter() -> Box<dyn OutputFormatter> {
        Box::new(JsonFormatter::new(true))
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ConfigModel};

    #[test]
    fn test_factory_selects_formatter() {
        let model = ConfigModel::default();

        let plain = OutputFormatterFactory::create_plain_formatter()
            .format_model(&model, Some(Category::System))
            .unwrap();
        assert!(plain.starts_with("[system]"));

        let json = OutputFormatterFactory::create_json_formatter()
            .format_model(&model, Some(Category::System))
            .unwrap();
        assert!(json.starts_with('{'));
    }
}
