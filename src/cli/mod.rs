//! Command-line interface

use crate::logging::LogFormat;
use crate::models::{Category, ConfigKey};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// TurtleBot 4 Setup - inspect and edit the robot's network and ROS configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "turtlebot4-setup")]
#[command(version, about, long_about = None)]
#[command(after_help = "Keys are written as category.KEY, e.g. wifi.SSID or export.ROS_DOMAIN_ID.\nRun `turtlebot4-setup env` for the supported environment variables.")]
pub struct Cli {
    /// Directory holding system, setup.bash and discovery.sh
    #[arg(long, global = true, value_name = "DIR")]
    pub setup_dir: Option<PathBuf>,

    /// Directory holding the netplan Wi-Fi file
    #[arg(long, global = true, value_name = "DIR")]
    pub netplan_dir: Option<PathBuf>,

    /// Hostname file
    #[arg(long, global = true, value_name = "FILE")]
    pub hostname_file: Option<PathBuf>,

    /// Environment file to load instead of ./.env
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long, global = true, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Diagnostic log format (console, json, compact)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the configuration, optionally a single category
    Show {
        /// system, wifi, export or discovery
        category: Option<Category>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print one value
    Get {
        /// Field to print, e.g. discovery.SERVER_ID
        key: ConfigKey,
    },

    /// Change one value and write the configuration
    Set {
        /// Field to change, e.g. export.ROS_DOMAIN_ID
        key: ConfigKey,

        /// New value; an empty string clears optional fields
        value: String,

        /// Show the result without writing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Restore a category's defaults and write the configuration
    Reset {
        category: Category,

        #[arg(long)]
        dry_run: bool,
    },

    /// Read and rewrite every file, normalizing their contents
    Apply,

    /// Print the discovery server list
    Discovery {
        /// Print the list for the Create 3 base instead
        #[arg(long)]
        create3: bool,
    },

    /// Check the configuration for suspicious combinations
    Validate,

    /// List the supported environment variables
    Env,
}

impl Cli {
    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Command Line:\n");
        summary.push_str(&format!("  Command: {:?}\n", self.command));
        if let Some(dir) = &self.setup_dir {
            summary.push_str(&format!("  Setup directory: {}\n", dir.display()));
        }
        if let Some(dir) = &self.netplan_dir {
            summary.push_str(&format!("  Netplan directory: {}\n", dir.display()));
        }
        if let Some(file) = &self.hostname_file {
            summary.push_str(&format!("  Hostname file: {}\n", file.display()));
        }
        if let Some(file) = &self.env_file {
            summary.push_str(&format!("  Environment file: {}\n", file.display()));
        }
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));
        summary.push_str(&format!("  Verbose mode: {}\n", self.verbose));
        summary.push_str(&format!("  Debug mode: {}\n", self.debug));

        summary
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoveryKey, ExportKey};

    #[test]
    fn test_parse_show() {
        let cli = Cli::parse_from(["test", "show", "wifi", "--json"]);
        assert_eq!(
            cli.command,
            Command::Show {
                category: Some(Category::Wifi),
                json: true
            }
        );
    }

    #[test]
    fn test_parse_set_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "test",
            "set",
            "export.ROS_DOMAIN_ID",
            "42",
            "--setup-dir",
            "/tmp/tb4",
            "--no-color",
        ]);
        assert_eq!(
            cli.command,
            Command::Set {
                key: ConfigKey::Export(ExportKey::DomainId),
                value: "42".to_string(),
                dry_run: false,
            }
        );
        assert_eq!(cli.setup_dir, Some(PathBuf::from("/tmp/tb4")));
        assert!(!cli.use_colors());
    }

    #[test]
    fn test_parse_get_and_dry_run() {
        let cli = Cli::parse_from(["test", "get", "discovery.SERVER_ID"]);
        assert_eq!(
            cli.command,
            Command::Get {
                key: ConfigKey::Discovery(DiscoveryKey::ServerId)
            }
        );

        let cli = Cli::parse_from(["test", "reset", "discovery", "--dry-run"]);
        assert_eq!(
            cli.command,
            Command::Reset {
                category: Category::Discovery,
                dry_run: true
            }
        );
    }

    #[test]
    fn test_rejects_unknown_key_and_category() {
        assert!(Cli::try_parse_from(["test", "get", "wifi.NOPE"]).is_err());
        assert!(Cli::try_parse_from(["test", "show", "network"]).is_err());
        assert!(Cli::try_parse_from(["test"]).is_err());
    }

    #[test]
    fn test_color_flags_conflict() {
        assert!(Cli::try_parse_from(["test", "--color", "--no-color", "apply"]).is_err());
        let cli = Cli::parse_from(["test", "--color", "apply"]);
        assert!(cli.use_colors());
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::parse_from(["test", "--log-format", "json", "validate"]);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(Cli::try_parse_from(["test", "--log-format", "xml", "validate"]).is_err());
    }
}
