//! Error handling for the TurtleBot 4 setup tool

use thiserror::Error;

/// Error types for configuration reading, editing and writing
#[derive(Error, Debug)]
pub enum AppError {
    /// Tool configuration errors (paths, environment overrides)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected or out-of-range values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed persisted values
    #[error("Parsing error: {0}")]
    Parse(String),

    /// I/O errors (permission denied, disk full, move failed)
    #[error("I/O error: {0}")]
    Io(String),

    /// A persisted source that does not exist yet
    #[error("Missing source: {0}")]
    MissingSource(String),

    /// Discovery server string that cannot be mapped to a local/remote pair
    #[error("Discovery topology error: {0}")]
    TopologyCorruption(String),

    /// Reading the persisted configuration failed; the model is unusable
    #[error("Error reading configuration: {0}")]
    ReadFailed(String),

    /// Writing stopped part way; earlier files were already replaced
    #[error("Error writing configuration: {0}. Configuration may be incomplete")]
    WriteIncomplete(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new missing-source error
    pub fn missing_source<S: Into<String>>(message: S) -> Self {
        Self::MissingSource(message.into())
    }

    /// Create a new topology corruption error
    pub fn topology<S: Into<String>>(message: S) -> Self {
        Self::TopologyCorruption(message.into())
    }

    /// Create a new fatal read error
    pub fn read_failed<S: Into<String>>(message: S) -> Self {
        Self::ReadFailed(message.into())
    }

    /// Create a new incomplete-write error
    pub fn write_incomplete<S: Into<String>>(message: S) -> Self {
        Self::WriteIncomplete(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Parse(_) => "PARSE",
            Self::Io(_) => "IO",
            Self::MissingSource(_) => "MISSING",
            Self::TopologyCorruption(_) => "TOPOLOGY",
            Self::ReadFailed(_) => "READ",
            Self::WriteIncomplete(_) => "WRITE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether the error is absorbed by falling back to defaults during a read
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::MissingSource(_) | Self::TopologyCorruption(_)
        )
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check your .env file, TURTLEBOT4_* variables or command line arguments.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Run `validate` to see the accepted ranges for each setting.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nSuggestion: Check the format of the configuration files under the setup directory.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check file permissions and disk space. Writing /etc usually requires sudo.", msg)
            }
            Self::MissingSource(msg) => {
                format!("Source not found: {}\n\nSuggestion: Defaults are used until the file is written once.", msg)
            }
            Self::TopologyCorruption(msg) => {
                format!("Discovery server string is inconsistent: {}\n\nSuggestion: Reset the discovery settings and save them again.", msg)
            }
            Self::ReadFailed(msg) => {
                format!("Could not read the robot configuration: {}\n\nSuggestion: Verify that the setup directory exists and is readable.", msg)
            }
            Self::WriteIncomplete(msg) => {
                format!("Configuration was only partially written: {}\n\nSuggestion: Fix the cause and run `apply` again to rewrite every file.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Io(_) | Self::MissingSource(_) => 2,
            Self::TopologyCorruption(_) => 3,
            Self::ReadFailed(_) => 4,
            Self::WriteIncomplete(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::MissingSource(_) | Self::TopologyCorruption(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Io(_) | Self::ReadFailed(_) | Self::WriteIncomplete(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<tempfile::PersistError> for AppError {
    fn from(error: tempfile::PersistError) -> Self {
        Self::io(format!("Failed to move temporary file into place: {}", error.error))
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::parse(format!("YAML parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<regex::Error> for AppError {
    fn from(error: regex::Error) -> Self {
        Self::internal(format!("Invalid pattern: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Boolean parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("IP address parse error: {}", error))
    }
}

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, AppError>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error, keeping its category
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;

    /// Add static context to an error
    fn context(self, message: &'static str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let context = f();
            match e.into() {
                AppError::Config(msg) => AppError::Config(format!("{}: {}", context, msg)),
                AppError::Validation(msg) => AppError::Validation(format!("{}: {}", context, msg)),
                AppError::Parse(msg) => AppError::Parse(format!("{}: {}", context, msg)),
                AppError::Io(msg) => AppError::Io(format!("{}: {}", context, msg)),
                AppError::MissingSource(msg) => AppError::MissingSource(format!("{}: {}", context, msg)),
                AppError::TopologyCorruption(msg) => AppError::TopologyCorruption(format!("{}: {}", context, msg)),
                AppError::ReadFailed(msg) => AppError::ReadFailed(format!("{}: {}", context, msg)),
                AppError::WriteIncomplete(msg) => AppError::WriteIncomplete(format!("{}: {}", context, msg)),
                AppError::Internal(msg) => AppError::Internal(format!("{}: {}", context, msg)),
            }
        })
    }

    fn context(self, message: &'static str) -> Result<T> {
        self.with_context(|| message.to_string())
    }
}

/// Error reporter for user feedback on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());
        }
    }

    /// Get formatted error summary
    pub fn format_error_summary(&self, errors: &[AppError]) -> String {
        if errors.is_empty() {
            return "No errors".to_string();
        }

        let mut summary = format!("Found {} error(s):", errors.len());

        let mut error_groups: std::collections::BTreeMap<&'static str, Vec<&AppError>> =
            std::collections::BTreeMap::new();
        for error in errors {
            error_groups.entry(error.category()).or_default().push(error);
        }

        for (category, group_errors) in error_groups {
            summary.push_str(&format!("\n  {}: {} error(s)", category, group_errors.len()));
            if self.verbose {
                for error in group_errors {
                    summary.push_str(&format!("\n    - {}", error));
                }
            }
        }

        summary
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
