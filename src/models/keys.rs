//! Closed key sets for the four configuration categories
//!
//! Keys are parsed from `category.KEY` strings on the command line, e.g.
//! `wifi.SSID` or `export.ROS_DOMAIN_ID`. Matching is case-insensitive.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four independent configuration partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    System,
    Wifi,
    Export,
    Discovery,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::System,
        Category::Wifi,
        Category::Export,
        Category::Discovery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::System => "system",
            Category::Wifi => "wifi",
            Category::Export => "export",
            Category::Discovery => "discovery",
        }
    }

    /// Every key belonging to this category, in display order
    pub fn keys(&self) -> Vec<ConfigKey> {
        match self {
            Category::System => SystemKey::ALL.iter().copied().map(ConfigKey::System).collect(),
            Category::Wifi => WifiKey::ALL.iter().copied().map(ConfigKey::Wifi).collect(),
            Category::Export => ExportKey::ALL.iter().copied().map(ConfigKey::Export).collect(),
            Category::Discovery => DiscoveryKey::ALL
                .iter()
                .copied()
                .map(ConfigKey::Discovery)
                .collect(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(Category::System),
            "wifi" | "wi-fi" => Ok(Category::Wifi),
            "export" | "bash" => Ok(Category::Export),
            "discovery" => Ok(Category::Discovery),
            _ => Err(AppError::validation(format!(
                "Unknown category '{}' (expected system, wifi, export or discovery)",
                s
            ))),
        }
    }
}

/// Generates a key enum with its persisted name table
macro_rules! key_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|key| key.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| AppError::validation(format!(
                        "Unknown {} key '{}'", stringify!($name), s
                    )))
            }
        }
    };
}

key_enum!(
    /// Robot identity fields
    SystemKey {
        Model => "MODEL",
        Version => "VERSION",
        Ros => "ROS",
        Hostname => "HOSTNAME",
        Ip => "IP",
    }
);

key_enum!(
    /// Wireless interface fields
    WifiKey {
        Ssid => "SSID",
        Password => "PASSWORD",
        RegDomain => "REG_DOMAIN",
        WifiMode => "WIFI_MODE",
        Band => "BAND",
        Ip => "IP",
        Dhcp => "DHCP",
    }
);

key_enum!(
    /// Environment variables exported by `setup.bash`
    ExportKey {
        CycloneDdsUri => "CYCLONEDDS_URI",
        FastRtpsUri => "FASTRTPS_DEFAULT_PROFILES_FILE",
        Namespace => "ROBOT_NAMESPACE",
        DomainId => "ROS_DOMAIN_ID",
        DiscoveryServer => "ROS_DISCOVERY_SERVER",
        Rmw => "RMW_IMPLEMENTATION",
        Diagnostics => "TURTLEBOT4_DIAGNOSTICS",
        Workspace => "WORKSPACE_SETUP",
        SuperClient => "ROS_SUPER_CLIENT",
    }
);

key_enum!(
    /// Discovery-server topology fields
    DiscoveryKey {
        Enabled => "ENABLED",
        Port => "PORT",
        ServerId => "SERVER_ID",
        OffboardIp => "OFFBOARD_IP",
        OffboardPort => "OFFBOARD_PORT",
        OffboardId => "OFFBOARD_ID",
    }
);

/// A field address: category plus a key from that category's closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigKey {
    System(SystemKey),
    Wifi(WifiKey),
    Export(ExportKey),
    Discovery(DiscoveryKey),
}

impl ConfigKey {
    pub fn category(&self) -> Category {
        match self {
            ConfigKey::System(_) => Category::System,
            ConfigKey::Wifi(_) => Category::Wifi,
            ConfigKey::Export(_) => Category::Export,
            ConfigKey::Discovery(_) => Category::Discovery,
        }
    }

    /// The key name without its category prefix
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::System(key) => key.as_str(),
            ConfigKey::Wifi(key) => key.as_str(),
            ConfigKey::Export(key) => key.as_str(),
            ConfigKey::Discovery(key) => key.as_str(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category(), self.name())
    }
}

impl From<SystemKey> for ConfigKey {
    fn from(key: SystemKey) -> Self {
        ConfigKey::System(key)
    }
}

impl From<WifiKey> for ConfigKey {
    fn from(key: WifiKey) -> Self {
        ConfigKey::Wifi(key)
    }
}

impl From<ExportKey> for ConfigKey {
    fn from(key: ExportKey) -> Self {
        ConfigKey::Export(key)
    }
}

impl From<DiscoveryKey> for ConfigKey {
    fn from(key: DiscoveryKey) -> Self {
        ConfigKey::Discovery(key)
    }
}

impl FromStr for ConfigKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let (category, key) = s.split_once('.').ok_or_else(|| {
            AppError::validation(format!(
                "Key '{}' must be written as category.KEY, e.g. wifi.SSID",
                s
            ))
        })?;

        Ok(match category.parse::<Category>()? {
            Category::System => ConfigKey::System(key.parse()?),
            Category::Wifi => ConfigKey::Wifi(key.parse()?),
            Category::Export => ConfigKey::Export(key.parse()?),
            Category::Discovery => ConfigKey::Discovery(key.parse()?),
        })
    }
}
