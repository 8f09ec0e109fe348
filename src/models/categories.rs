//! Per-category configuration records and their default snapshots

use super::keys::ExportKey;
use crate::defaults;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Robot identity as recorded in the system file and hostname file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConf {
    pub model: String,
    pub version: String,
    pub ros: String,
    pub hostname: String,
    /// Derived from the live interfaces; never persisted
    pub ip: Option<String>,
}

impl Default for SystemConf {
    fn default() -> Self {
        Self {
            model: defaults::DEFAULT_MODEL.to_string(),
            version: defaults::DEFAULT_VERSION.to_string(),
            ros: defaults::DEFAULT_ROS.to_string(),
            hostname: defaults::DEFAULT_HOSTNAME.to_string(),
            ip: None,
        }
    }
}

/// Wi-Fi operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiMode {
    Client,
    AccessPoint,
}

impl WifiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiMode::Client => "Client",
            WifiMode::AccessPoint => "Access Point",
        }
    }
}

impl fmt::Display for WifiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WifiMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "client" | "infrastructure" => Ok(WifiMode::Client),
            "access point" | "accesspoint" | "ap" => Ok(WifiMode::AccessPoint),
            _ => Err(AppError::validation(format!(
                "Invalid Wi-Fi mode '{}' (expected Client or Access Point)",
                s
            ))),
        }
    }
}

/// Wi-Fi frequency band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiBand {
    #[serde(rename = "5GHz")]
    FiveGhz,
    #[serde(rename = "2.4GHz")]
    TwoPointFourGhz,
    Any,
}

impl WifiBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiBand::FiveGhz => "5GHz",
            WifiBand::TwoPointFourGhz => "2.4GHz",
            WifiBand::Any => "Any",
        }
    }
}

impl fmt::Display for WifiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WifiBand {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "5ghz" | "5" => Ok(WifiBand::FiveGhz),
            "2.4ghz" | "2.4" => Ok(WifiBand::TwoPointFourGhz),
            "any" => Ok(WifiBand::Any),
            _ => Err(AppError::validation(format!(
                "Invalid band '{}' (expected 5GHz, 2.4GHz or Any)",
                s
            ))),
        }
    }
}

/// Wireless interface settings mirrored into the netplan file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiConf {
    pub ssid: String,
    pub password: Option<String>,
    /// Kept in the model only; netplan has no field for it
    pub reg_domain: String,
    pub mode: WifiMode,
    pub band: Option<WifiBand>,
    /// Static address with prefix, e.g. `192.168.0.12/24`
    pub ip: Option<String>,
    pub dhcp: bool,
}

impl Default for WifiConf {
    fn default() -> Self {
        Self {
            ssid: defaults::DEFAULT_SSID.to_string(),
            password: Some(defaults::DEFAULT_WIFI_PASSWORD.to_string()),
            reg_domain: defaults::DEFAULT_REG_DOMAIN.to_string(),
            mode: WifiMode::AccessPoint,
            band: Some(WifiBand::FiveGhz),
            ip: None,
            dhcp: true,
        }
    }
}

/// Values of the exported environment variables, `None` meaning absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConf {
    values: BTreeMap<ExportKey, Option<String>>,
}

impl Default for ExportConf {
    fn default() -> Self {
        let mut conf = Self { values: BTreeMap::new() };
        conf.set(ExportKey::CycloneDdsUri, Some(format!("{}cyclonedds_rpi.xml", defaults::DEFAULT_SETUP_DIR)));
        conf.set(ExportKey::FastRtpsUri, Some(format!("{}fastdds_rpi.xml", defaults::DEFAULT_SETUP_DIR)));
        conf.set(ExportKey::Namespace, None);
        conf.set(ExportKey::DomainId, Some(defaults::DEFAULT_DOMAIN_ID.to_string()));
        conf.set(ExportKey::DiscoveryServer, None);
        conf.set(ExportKey::Rmw, Some(defaults::RMW_FASTRTPS.to_string()));
        conf.set(ExportKey::Diagnostics, Some("1".to_string()));
        conf.set(ExportKey::Workspace, Some(defaults::DEFAULT_WORKSPACE_SETUP.to_string()));
        conf.set(ExportKey::SuperClient, Some(defaults::FALSE_LITERAL.to_string()));
        conf
    }
}

impl ExportConf {
    pub fn get(&self, key: ExportKey) -> Option<&str> {
        self.values.get(&key).and_then(|value| value.as_deref())
    }

    pub fn set(&mut self, key: ExportKey, value: Option<String>) {
        self.values.insert(key, value);
    }

    /// All keys with their values, in declaration order
    pub fn entries(&self) -> Vec<(ExportKey, Option<String>)> {
        ExportKey::ALL
            .iter()
            .map(|key| (*key, self.get(*key).map(str::to_string)))
            .collect()
    }

    /// Raw discovery server string; empty counts as absent
    pub fn discovery_server(&self) -> Option<&str> {
        self.get(ExportKey::DiscoveryServer).filter(|raw| !raw.is_empty())
    }

    /// Whether the super-client export holds the boolean-true literal
    pub fn super_client(&self) -> bool {
        self.get(ExportKey::SuperClient)
            .map(|value| value.eq_ignore_ascii_case(defaults::TRUE_LITERAL))
            .unwrap_or(false)
    }

    /// Domain ID as a number, if present
    pub fn domain_id(&self) -> Option<Result<i64>> {
        self.get(ExportKey::DomainId)
            .map(|raw| raw.trim().parse::<i64>().map_err(AppError::from))
    }
}

/// Normalized view of the discovery server string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConf {
    pub enabled: bool,
    pub port: u16,
    pub server_id: u8,
    pub offboard_ip: Option<String>,
    pub offboard_port: u16,
    pub offboard_id: u8,
}

impl Default for DiscoveryConf {
    fn default() -> Self {
        Self {
            enabled: false,
            port: defaults::DEFAULT_DISCOVERY_PORT,
            server_id: 0,
            offboard_ip: None,
            offboard_port: defaults::DEFAULT_DISCOVERY_PORT,
            offboard_id: defaults::DEFAULT_OFFBOARD_ID,
        }
    }
}
