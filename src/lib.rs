//! TurtleBot 4 Setup
//!
//! Reconciles the robot's typed network/middleware configuration with the
//! files it is persisted in: the system info file, the netplan Wi-Fi
//! description, the `setup.bash` export file and the discovery-server
//! topology string embedded in one of its exports.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Category, ConfigKey, ConfigModel, ConfigValue, SetOutcome, Settings};
pub use orchestrator::ConfigOrchestrator;
pub use output::{OutputFormatter, OutputFormatterFactory};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_SETUP_DIR: &str = "/etc/turtlebot4/";
    pub const DEFAULT_NETPLAN_DIR: &str = "/etc/netplan/";
    pub const DEFAULT_HOSTNAME_FILE: &str = "/etc/hostname";
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const DEFAULT_MODEL: &str = "lite";
    pub const DEFAULT_VERSION: &str = "2.0.2";
    pub const DEFAULT_ROS: &str = "Jazzy";
    pub const DEFAULT_HOSTNAME: &str = "turtlebot4";

    pub const DEFAULT_SSID: &str = "Turtlebot4";
    pub const DEFAULT_WIFI_PASSWORD: &str = "Turtlebot4";
    pub const DEFAULT_REG_DOMAIN: &str = "CA";

    pub const DEFAULT_DOMAIN_ID: u8 = 0;
    pub const DEFAULT_WORKSPACE_SETUP: &str = "/opt/ros/jazzy/setup.bash";
    pub const RMW_FASTRTPS: &str = "rmw_fastrtps_cpp";
    pub const RMW_CYCLONEDDS: &str = "rmw_cyclonedds_cpp";

    /// Boolean literals as written into `setup.bash`
    pub const TRUE_LITERAL: &str = "True";
    pub const FALSE_LITERAL: &str = "False";

    pub const DEFAULT_DISCOVERY_PORT: u16 = 11811;
    pub const MIN_DISCOVERY_PORT: u16 = 10000;
    pub const DEFAULT_OFFBOARD_ID: u8 = 1;
    pub const LOOPBACK_ADDRESS: &str = "127.0.0.1";

    /// Address of the Raspberry Pi on the USB link to the Create 3 base
    pub const COMPANION_LINK_ADDRESS: &str = "192.168.186.3";

    pub const GENERATED_FILE_NOTICE: &str =
        "# This file was automatically created by the turtlebot4-setup tool and should not be manually modified";
}
