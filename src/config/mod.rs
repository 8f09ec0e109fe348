//! Tool configuration: settings resolution and model validation

pub mod env;
pub mod parser;
pub mod validation;

// Re-export main functionality
pub use env::EnvManager;
pub use parser::{display_settings_summary, load_settings, SettingsParser};
pub use validation::{validate_config, ConfigValidator, ValidationLevel, ValidationWarning};

// Re-export from models for convenience
pub use crate::models::Settings;
