//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load an explicit environment file, or `./.env` if it exists
    ///
    /// Variables already set in the process environment are not overridden.
    /// Returns the file that was loaded.
    pub fn load_env_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            dotenv::from_path(path).map_err(|e| {
                AppError::config(format!("Failed to load environment file '{}': {}", path.display(), e))
            })?;
            return Ok(Some(path.to_path_buf()));
        }

        let default = Path::new(".env");
        if default.exists() {
            dotenv::from_filename(default)
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;
            return Ok(Some(default.to_path_buf()));
        }

        Ok(None)
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# TurtleBot 4 Setup Configuration
#
# Values here are used when the variables are not already set in the
# environment; command-line flags override both.

# Directory holding system, setup.bash and discovery.sh
# TURTLEBOT4_SETUP_DIR=/etc/turtlebot4/

# Directory holding 50-wifis.yaml
# TURTLEBOT4_NETPLAN_DIR=/etc/netplan/

# Hostname file
# TURTLEBOT4_HOSTNAME_FILE=/etc/hostname

# Enable colored output (true/false)
# TURTLEBOT4_ENABLE_COLOR=true

# Diagnostic log format (console/json/compact)
# TURTLEBOT4_LOG_FORMAT=console

# Working on a copy of the robot's files:
# TURTLEBOT4_SETUP_DIR=./robot/etc/turtlebot4/
# TURTLEBOT4_NETPLAN_DIR=./robot/etc/netplan/
# TURTLEBOT4_HOSTNAME_FILE=./robot/etc/hostname
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "TURTLEBOT4_SETUP_DIR" | "TURTLEBOT4_NETPLAN_DIR" | "TURTLEBOT4_HOSTNAME_FILE" => {
                if value.trim().is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            "TURTLEBOT4_ENABLE_COLOR" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "TURTLEBOT4_LOG_FORMAT" => {
                value.parse::<crate::logging::LogFormat>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TURTLEBOT4_SETUP_DIR", "Directory holding system, setup.bash and discovery.sh", "/etc/turtlebot4/"),
            ("TURTLEBOT4_NETPLAN_DIR", "Directory holding 50-wifis.yaml", "/etc/netplan/"),
            ("TURTLEBOT4_HOSTNAME_FILE", "Hostname file", "/etc/hostname"),
            ("TURTLEBOT4_ENABLE_COLOR", "Enable colored output", "true"),
            ("TURTLEBOT4_LOG_FORMAT", "Diagnostic log format (console, json, compact)", "console"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<26} {}\n", var, description));
            help.push_str(&format!("  {:<26} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        let mut warnings = Vec::new();

        for (var_name, _, _) in Self::get_supported_env_vars() {
            if let Ok(value) = std::env::var(var_name) {
                if let Err(e) = Self::validate_env_var(var_name, &value) {
                    warnings.push(format!("Warning: {}", e));
                }
            }
        }

        warnings
    }

    /// Validate the assignments in an environment file without loading it
    pub fn check_env_file(path: &Path) -> Result<Option<Vec<String>>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("Failed to read '{}': {}", path.display(), e)))?;

        let mut warnings = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().trim_start_matches("export ").trim();
                let value = value.trim().trim_matches(|c| c == '"' || c == '\'');

                if let Err(e) = Self::validate_env_var(key, value) {
                    warnings.push(format!("Line '{}': {}", line, e));
                }
            }
        }

        Ok(Some(warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_example_content_lists_every_variable() {
        let content = EnvManager::create_example_env_content();
        for (var, _, _) in EnvManager::get_supported_env_vars() {
            assert!(content.contains(&format!("{}=", var)), "{} missing", var);
        }
    }

    #[test]
    fn test_save_example_file() {
        let temp_file = NamedTempFile::new().unwrap();
        EnvManager::save_example_env_file(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("TurtleBot 4 Setup Configuration"));
    }

    #[test]
    fn test_validate_env_var() {
        assert!(EnvManager::validate_env_var("TURTLEBOT4_SETUP_DIR", "/etc/turtlebot4/").is_ok());
        assert!(EnvManager::validate_env_var("TURTLEBOT4_ENABLE_COLOR", "false").is_ok());
        assert!(EnvManager::validate_env_var("TURTLEBOT4_LOG_FORMAT", "json").is_ok());
        assert!(EnvManager::validate_env_var("UNRELATED", "anything").is_ok());

        assert!(EnvManager::validate_env_var("TURTLEBOT4_SETUP_DIR", "  ").is_err());
        assert!(EnvManager::validate_env_var("TURTLEBOT4_ENABLE_COLOR", "maybe").is_err());
        assert!(EnvManager::validate_env_var("TURTLEBOT4_LOG_FORMAT", "xml").is_err());
    }

    #[test]
    fn test_display_env_help() {
        let help = EnvManager::display_env_help();
        assert!(help.contains("Supported Environment Variables:"));
        assert!(help.contains("TURTLEBOT4_NETPLAN_DIR"));
        assert!(help.contains("Configuration Priority"));
    }

    #[test]
    fn test_check_env_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        assert!(EnvManager::check_env_file(&path).unwrap().is_none());

        std::fs::write(
            &path,
            "# comment\nTURTLEBOT4_ENABLE_COLOR=perhaps\nexport TURTLEBOT4_LOG_FORMAT=\"json\"\n",
        )
        .unwrap();
        let warnings = EnvManager::check_env_file(&path).unwrap().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("TURTLEBOT4_ENABLE_COLOR"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = EnvManager::load_env_file(Some(&dir.path().join("missing.env"))).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
