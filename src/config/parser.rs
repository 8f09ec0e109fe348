//! Settings resolution from CLI arguments, environment variables and .env files

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Settings};

/// Settings parser combining CLI arguments with environment variables
pub struct SettingsParser {
    cli: Cli,
}

impl SettingsParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete settings
    pub fn parse(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        // .env values only fill variables that are not already set
        EnvManager::load_env_file(self.cli.env_file.as_deref())?;

        settings.merge_from_env()?;
        self.apply_cli_overrides(&mut settings);
        settings.validate()?;

        Ok(settings)
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&self, settings: &mut Settings) {
        if let Some(dir) = &self.cli.setup_dir {
            settings.setup_dir = dir.clone();
        }
        if let Some(dir) = &self.cli.netplan_dir {
            settings.netplan_dir = dir.clone();
        }
        if let Some(file) = &self.cli.hostname_file {
            settings.hostname_file = file.clone();
        }
        if let Some(format) = self.cli.log_format {
            settings.log_format = format;
        }

        if self.cli.color {
            settings.enable_color = true;
        } else if self.cli.no_color {
            settings.enable_color = false;
        }

        // CLI-only flags
        settings.verbose = self.cli.verbose;
        settings.debug = self.cli.debug;
    }
}

/// Convenience function to load the complete settings from CLI arguments
pub fn load_settings(cli: Cli) -> Result<Settings> {
    SettingsParser::new(cli).parse()
}

/// Display settings summary for debug purposes
pub fn display_settings_summary(settings: &Settings) -> String {
    let paths = settings.paths();
    let mut summary = Vec::new();

    summary.push(format!("System file: {}", paths.system_file.display()));
    summary.push(format!("Export file: {}", paths.setup_bash_file.display()));
    summary.push(format!("Netplan file: {}", paths.netplan_wifis_file.display()));
    summary.push(format!("Discovery launcher: {}", paths.discovery_sh_file.display()));
    summary.push(format!("Hostname file: {}", paths.hostname_file.display()));
    summary.push(format!("Color Output: {}", settings.enable_color));
    summary.push(format!("Log Format: {:?}", settings.log_format));
    summary.push(format!("Verbose: {}", settings.verbose));
    summary.push(format!("Debug: {}", settings.debug));

    summary.join("\n")
}
