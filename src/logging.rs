//! Structured logging for the setup tool
//!
//! Diagnostics always go to stderr so that `show --json` and `get` keep a
//! clean stdout. Entries carry a session ID, an optional correlation ID per
//! read/write operation and arbitrary structured fields.

use crate::error::{AppError, Result};
use crate::models::Settings;
use crate::types::FileKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - fallbacks and suspicious values
    Warn = 3,
    /// Error level - failed operations
    Error = 4,
    /// Fatal level - the process is about to exit
    Fatal = 5,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",    // White
            LogLevel::Debug => "\x1b[36m",    // Cyan
            LogLevel::Info => "\x1b[32m",     // Green
            LogLevel::Warn => "\x1b[33m",     // Yellow
            LogLevel::Error => "\x1b[31m",    // Red
            LogLevel::Fatal => "\x1b[35m",    // Magenta
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID for tracking related events
    pub correlation_id: Option<String>,
    /// Additional structured fields
    pub fields: BTreeMap<String, serde_json::Value>,
    /// File and line information
    pub location: Option<LogLocation>,
}

/// Source code location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console format
    #[default]
    Console,
    /// JSON lines for log collectors
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "console" | "text" => Ok(LogFormat::Console),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(AppError::parse(format!(
                "Invalid log format: {} (expected console, json or compact)",
                s
            ))),
        }
    }
}

/// Shared logging context for correlation and session tracking
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    current_correlation_id: Option<String>,
    context_fields: BTreeMap<String, serde_json::Value>,
}

/// Logger writing formatted entries to stderr
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: &str) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name: name.to_string(),
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger from the tool settings
    ///
    /// Without `--verbose` only warnings and errors are shown.
    pub fn with_settings(name: &str, settings: &Settings) -> Self {
        let min_level = if settings.debug {
            LogLevel::Debug
        } else if settings.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: settings.enable_color,
            include_location: settings.debug,
            format: settings.log_format,
            name: name.to_string(),
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// A logger that only reports errors, for library callers and tests
    pub fn quiet(name: &str) -> Self {
        let mut logger = Self::new(name);
        logger.set_level(LogLevel::Error);
        logger.set_color(false);
        logger
    }

    /// Derive a logger with another component name sharing this context
    pub fn named(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set session correlation ID
    pub fn set_session_id(&self, session_id: String) {
        if let Ok(mut context) = self.context.write() {
            context.session_id = Some(session_id);
        }
    }

    /// Add context field for all subsequent log entries
    pub fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            if let Ok(mut context) = self.context.write() {
                context.context_fields.insert(key.to_string(), json_value);
            }
        }
    }

    /// Start a correlated operation
    pub fn start_operation(&self, operation_name: &str) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        if let Ok(mut context) = self.context.write() {
            context.current_correlation_id = Some(correlation_id.clone());
        }

        self.debug(&format!("Started operation: {}", operation_name))
            .correlation_id(&correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "start")
            .log();

        correlation_id
    }

    /// End a correlated operation
    pub fn end_operation(&self, correlation_id: &str, operation_name: &str, success: bool) {
        let level = if success { LogLevel::Info } else { LogLevel::Error };
        self.log(level, &format!("Completed operation: {} (success: {})", operation_name, success))
            .correlation_id(correlation_id)
            .field("operation", operation_name)
            .field("operation_type", "end")
            .field("success", success)
            .log();

        if let Ok(mut context) = self.context.write() {
            if context.current_correlation_id.as_deref() == Some(correlation_id) {
                context.current_correlation_id = None;
            }
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Fatal, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Log a file being read
    pub fn file_read(&self, kind: FileKind, path: &Path, found: bool) {
        self.debug(&format!("Read {} from {}", kind, path.display()))
            .field("file", kind.as_str())
            .field("path", path.display().to_string())
            .field("found", found)
            .log();
    }

    /// Log a file being replaced on disk
    pub fn file_committed(&self, kind: FileKind, path: &Path, bytes: usize) {
        self.info(&format!("Wrote {} to {}", kind, path.display()))
            .field("file", kind.as_str())
            .field("path", path.display().to_string())
            .field("bytes", bytes)
            .log();
    }

    /// Log a category falling back to its default snapshot
    pub fn fallback(&self, category: &str, error: &AppError) {
        self.warn(&format!("Using default {} configuration: {}", category, error))
            .field("category", category)
            .error_info(error)
            .log();
    }

    fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        if let Ok(context) = self.context.read() {
            if let Some(session_id) = &context.session_id {
                entry.fields.insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
            }
            if entry.correlation_id.is_none() {
                entry.correlation_id = context.current_correlation_id.clone();
            }
            for (key, value) in &context.context_fields {
                entry.fields.insert(key.clone(), value.clone());
            }
        }

        let _ = writeln!(io::stderr(), "{}", self.format_entry(&entry));
    }

    /// Render an entry in the configured format
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short = correlation_id.get(..8).unwrap_or(correlation_id);
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let fields_str: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => serde_json::json!({
                "error": "Failed to serialize log entry",
                "message": entry.message,
            })
            .to_string(),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!("{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: BTreeMap::new(),
                location: None,
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_soft", error.is_soft())
            .field("error_exit_code", error.exit_code())
    }

    /// The entry as built so far
    pub fn entry(&self) -> &LogEntry {
        &self.entry
    }

    /// Finalize and write the log entry
    pub fn log(self) {
        self.logger.write_entry(self.entry);
    }
}

/// Factory creating loggers that share one session
pub struct LoggerFactory {
    settings: Settings,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a logger tagged with this factory's session
    pub fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_settings(name, &self.settings);
        logger.set_session_id(self.session_id.clone());
        logger
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Convenience macros for logging with location information
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)*) => {
        $logger.warn(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        $logger.error(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str(" Compact ").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::default(), LogFormat::Console);
        assert!(LogFormat::from_str("xml").is_err());
    }

    #[test]
    fn test_logger_with_settings() {
        let settings = Settings {
            debug: true,
            enable_color: false,
            ..Default::default()
        };
        let logger = Logger::with_settings("TEST", &settings);
        assert_eq!(logger.min_level, LogLevel::Debug);
        assert!(!logger.use_color);
        assert!(logger.include_location);

        let quiet = Logger::with_settings("TEST", &Settings::default());
        assert!(!quiet.would_log(LogLevel::Info));
        assert!(quiet.would_log(LogLevel::Warn));
    }

    #[test]
    fn test_session_and_context_fields() {
        let logger = Logger::new("TEST");
        logger.set_session_id("test-session".to_string());
        logger.add_context_field("setup_dir", "/etc/turtlebot4/");

        let context = logger.context.read().unwrap();
        assert_eq!(context.session_id.as_deref(), Some("test-session"));
        assert!(context.context_fields.contains_key("setup_dir"));
    }

    #[test]
    fn test_named_logger_shares_context() {
        let logger = Logger::new("ORCH");
        let child = logger.named("CODEC");
        logger.set_session_id("shared".to_string());

        assert_eq!(child.name(), "CODEC");
        let context = child.context.read().unwrap();
        assert_eq!(context.session_id.as_deref(), Some("shared"));
    }

    #[test]
    fn test_operation_correlation() {
        let logger = Logger::quiet("TEST");
        let correlation_id = logger.start_operation("read");
        assert!(!correlation_id.is_empty());
        assert_eq!(
            logger.context.read().unwrap().current_correlation_id.as_deref(),
            Some(correlation_id.as_str())
        );

        logger.end_operation(&correlation_id, "read", true);
        assert!(logger.context.read().unwrap().current_correlation_id.is_none());
    }

    #[test]
    fn test_log_formats() {
        let mut logger = Logger::new("TEST");
        logger.set_color(false);
        let builder = logger.warn("discovery fallback")
            .correlation_id("abc")
            .field("category", "discovery");
        let entry = builder.entry().clone();

        let console = logger.format_entry(&entry);
        assert!(console.contains(" WARN [TEST] discovery fallback [abc]"));
        assert!(console.contains("category=\"discovery\""));

        logger.set_format(LogFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&logger.format_entry(&entry)).unwrap();
        assert_eq!(json["level"], "Warn");
        assert_eq!(json["fields"]["category"], "discovery");

        logger.set_format(LogFormat::Compact);
        assert!(logger.format_entry(&entry).ends_with("W TEST: discovery fallback"));
    }

    #[test]
    fn test_error_info_fields() {
        let logger = Logger::quiet("TEST");
        let error = AppError::topology("duplicate local server");
        let builder = logger.warn("fallback").error_info(&error);
        let fields = &builder.entry().fields;
        assert_eq!(fields["error_category"], "TOPOLOGY");
        assert_eq!(fields["error_soft"], true);
    }

    #[test]
    fn test_location_shown_in_debug_mode() {
        let settings = Settings {
            debug: true,
            enable_color: false,
            ..Default::default()
        };
        let logger = Logger::with_settings("TEST", &settings);
        let builder = logger.error("commit failed").location("src/orchestrator.rs", 42, Some("orchestrator"));
        let entry = builder.entry().clone();
        assert_eq!(entry.location.as_ref().map(|l| l.line), Some(42));
        assert!(logger.format_entry(&entry).ends_with(" @ src/orchestrator.rs:42"));

        let plain = Logger::new("TEST");
        assert!(!plain.format_entry(&entry).contains(" @ "));
    }

    #[test]
    fn test_logging_macros() {
        let logger = Logger::quiet("TEST");
        crate::log_debug!(logger, "set {}", "wifi.SSID");
        crate::log_info!(logger, "restoring {}", "wifi");
        crate::log_warn!(logger, "clamped {} to {}", 150, 101);
        crate::log_error!(logger, "read failed: {}", "setup.bash");
    }

    #[test]
    fn test_logger_factory() {
        let factory = LoggerFactory::new(Settings::default());
        let logger = factory.create_logger("TEST");
        assert_eq!(logger.name(), "TEST");
        assert!(!factory.session_id().is_empty());
    }
}
