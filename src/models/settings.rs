//! Tool settings: where the persisted files live and how to report

use crate::logging::LogFormat;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime settings of the setup tool itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding `system`, `setup.bash` and `discovery.sh`
    #[serde(default = "default_setup_dir")]
    pub setup_dir: PathBuf,

    /// Directory holding the netplan Wi-Fi description
    #[serde(default = "default_netplan_dir")]
    pub netplan_dir: PathBuf,

    /// Hostname file
    #[serde(default = "default_hostname_file")]
    pub hostname_file: PathBuf,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Log format for diagnostics on stderr
    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

/// Absolute locations of every file the tool reads or writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub system_file: PathBuf,
    pub setup_bash_file: PathBuf,
    pub netplan_wifis_file: PathBuf,
    pub discovery_sh_file: PathBuf,
    pub hostname_file: PathBuf,
}

impl ConfigPaths {
    /// Lay out the standard file names under the given directories
    pub fn new(setup_dir: &Path, netplan_dir: &Path, hostname_file: &Path) -> Self {
        Self {
            system_file: setup_dir.join("system"),
            setup_bash_file: setup_dir.join("setup.bash"),
            netplan_wifis_file: netplan_dir.join("50-wifis.yaml"),
            discovery_sh_file: setup_dir.join("discovery.sh"),
            hostname_file: hostname_file.to_path_buf(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            setup_dir: default_setup_dir(),
            netplan_dir: default_netplan_dir(),
            hostname_file: default_hostname_file(),
            enable_color: default_enable_color(),
            log_format: LogFormat::default(),
            verbose: false,
            debug: false,
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings rooted in a scratch directory, used by tests and dry runs
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            setup_dir: root.join("turtlebot4"),
            netplan_dir: root.join("netplan"),
            hostname_file: root.join("hostname"),
            enable_color: false,
            ..Self::default()
        }
    }

    pub fn paths(&self) -> ConfigPaths {
        ConfigPaths::new(&self.setup_dir, &self.netplan_dir, &self.hostname_file)
    }

    /// Validate the settings and return any errors
    pub fn validate(&self) -> Result<()> {
        for (name, path) in [
            ("Setup directory", &self.setup_dir),
            ("Netplan directory", &self.netplan_dir),
            ("Hostname file", &self.hostname_file),
        ] {
            if path.as_os_str().is_empty() {
                return Err(AppError::config(format!("{} cannot be empty", name)));
            }
        }

        if self.setup_dir.is_file() {
            return Err(AppError::config(format!(
                "Setup directory '{}' is a file",
                self.setup_dir.display()
            )));
        }

        if self.netplan_dir.is_file() {
            return Err(AppError::config(format!(
                "Netplan directory '{}' is a file",
                self.netplan_dir.display()
            )));
        }

        Ok(())
    }

    /// Merge `TURTLEBOT4_*` environment variables into these settings
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("TURTLEBOT4_SETUP_DIR") {
            self.setup_dir = PathBuf::from(dir.trim());
        }

        if let Ok(dir) = std::env::var("TURTLEBOT4_NETPLAN_DIR") {
            self.netplan_dir = PathBuf::from(dir.trim());
        }

        if let Ok(file) = std::env::var("TURTLEBOT4_HOSTNAME_FILE") {
            self.hostname_file = PathBuf::from(file.trim());
        }

        if let Ok(enable_color) = std::env::var("TURTLEBOT4_ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TURTLEBOT4_ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        if let Ok(format) = std::env::var("TURTLEBOT4_LOG_FORMAT") {
            self.log_format = format.parse()
                .map_err(|e| AppError::config(format!("Invalid TURTLEBOT4_LOG_FORMAT value '{}': {}", format, e)))?;
        }

        Ok(())
    }
}

fn default_setup_dir() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_SETUP_DIR)
}

fn default_netplan_dir() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_NETPLAN_DIR)
}

fn default_hostname_file() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_HOSTNAME_FILE)
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.setup_dir, PathBuf::from("/etc/turtlebot4/"));
    }

    #[test]
    fn test_paths_layout() {
        let paths = Settings::default().paths();
        assert_eq!(paths.setup_bash_file, PathBuf::from("/etc/turtlebot4/setup.bash"));
        assert_eq!(paths.system_file, PathBuf::from("/etc/turtlebot4/system"));
        assert_eq!(paths.discovery_sh_file, PathBuf::from("/etc/turtlebot4/discovery.sh"));
        assert_eq!(paths.netplan_wifis_file, PathBuf::from("/etc/netplan/50-wifis.yaml"));
        assert_eq!(paths.hostname_file, PathBuf::from("/etc/hostname"));
    }

    #[test]
    fn test_empty_directory_invalid() {
        let mut settings = Settings::default();
        settings.setup_dir = PathBuf::new();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_setup_dir_pointing_at_file_invalid() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut settings = Settings::default();
        settings.setup_dir = file.path().to_path_buf();
        assert!(settings.validate().is_err());
    }
}
