//! Typed in-memory configuration model and its editing rules
//!
//! The model holds four independent categories. Setters are the editing
//! layer: they clamp numeric inputs into their valid ranges, normalize text
//! spellings and reject updates that would break the discovery ID invariant.

use super::categories::{DiscoveryConf, ExportConf, SystemConf, WifiConf};
use super::keys::{Category, ConfigKey, DiscoveryKey, ExportKey, SystemKey, WifiKey};
use super::value::ConfigValue;
use crate::defaults;
use crate::error::{AppError, Result};
use serde::Serialize;

/// Result of a single `set` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// Stored as given (after spelling normalization)
    Applied,
    /// Stored after clamping into the valid range
    Clamped { requested: i64, stored: i64 },
    /// Left unchanged; the prior value is retained
    Rejected(String),
}

impl SetOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, SetOutcome::Rejected(_))
    }
}

/// Clamp a ROS domain ID into 0..=101 or 215..=232; the gap clamps down
pub fn clamp_domain_id(requested: i64) -> i64 {
    match requested {
        i64::MIN..=0 => 0,
        1..=101 => requested,
        102..=214 => 101,
        215..=232 => requested,
        _ => 232,
    }
}

/// Clamp a discovery server port into 10000..=65535
pub fn clamp_discovery_port(requested: i64) -> u16 {
    let clamped = requested.clamp(
        i64::from(defaults::MIN_DISCOVERY_PORT),
        i64::from(u16::MAX),
    );
    u16::try_from(clamped).unwrap_or(u16::MAX)
}

/// Clamp a discovery server ID into 0..=255
pub fn clamp_server_id(requested: i64) -> u8 {
    u8::try_from(requested.clamp(0, i64::from(u8::MAX))).unwrap_or(u8::MAX)
}

fn outcome(requested: i64, stored: i64) -> SetOutcome {
    if requested == stored {
        SetOutcome::Applied
    } else {
        SetOutcome::Clamped { requested, stored }
    }
}

fn require_number(key: ConfigKey, value: &ConfigValue) -> Result<i64> {
    value
        .as_number()
        .ok_or_else(|| AppError::validation(format!("{} requires a number, got '{}'", key, value)))
}

fn require_flag(key: ConfigKey, value: &ConfigValue) -> Result<bool> {
    value
        .as_flag()
        .ok_or_else(|| AppError::validation(format!("{} requires True or False, got '{}'", key, value)))
}

/// The four configuration categories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigModel {
    pub system: SystemConf,
    pub wifi: WifiConf,
    pub export: ExportConf,
    pub discovery: DiscoveryConf,
}

impl ConfigModel {
    /// Create a model holding every default snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Read one field
    pub fn get(&self, key: impl Into<ConfigKey>) -> ConfigValue {
        match key.into() {
            ConfigKey::System(key) => self.get_system(key),
            ConfigKey::Wifi(key) => self.get_wifi(key),
            ConfigKey::Export(key) => self.export.get(key).map(str::to_string).into(),
            ConfigKey::Discovery(key) => self.get_discovery(key),
        }
    }

    /// Update one field through the editing rules
    pub fn set(&mut self, key: impl Into<ConfigKey>, value: impl Into<ConfigValue>) -> Result<SetOutcome> {
        let key = key.into();
        let value = value.into();
        match key {
            ConfigKey::System(field) => self.set_system(key, field, &value),
            ConfigKey::Wifi(field) => self.set_wifi(key, field, &value),
            ConfigKey::Export(field) => self.set_export(key, field, &value),
            ConfigKey::Discovery(field) => self.set_discovery(key, field, &value),
        }
    }

    /// Replace one category with its default snapshot
    pub fn apply_default(&mut self, category: Category) {
        match category {
            Category::System => self.system = SystemConf::default(),
            Category::Wifi => self.wifi = WifiConf::default(),
            Category::Export => self.export = ExportConf::default(),
            Category::Discovery => self.discovery = DiscoveryConf::default(),
        }
    }

    fn get_system(&self, key: SystemKey) -> ConfigValue {
        match key {
            SystemKey::Model => self.system.model.clone().into(),
            SystemKey::Version => self.system.version.clone().into(),
            SystemKey::Ros => self.system.ros.clone().into(),
            SystemKey::Hostname => self.system.hostname.clone().into(),
            SystemKey::Ip => self.system.ip.clone().into(),
        }
    }

    fn get_wifi(&self, key: WifiKey) -> ConfigValue {
        match key {
            WifiKey::Ssid => self.wifi.ssid.clone().into(),
            WifiKey::Password => self.wifi.password.clone().into(),
            WifiKey::RegDomain => self.wifi.reg_domain.clone().into(),
            WifiKey::WifiMode => self.wifi.mode.as_str().into(),
            WifiKey::Band => self.wifi.band.map(|band| band.as_str()).into(),
            WifiKey::Ip => self.wifi.ip.clone().into(),
            WifiKey::Dhcp => self.wifi.dhcp.into(),
        }
    }

    fn get_discovery(&self, key: DiscoveryKey) -> ConfigValue {
        let discovery = &self.discovery;
        match key {
            DiscoveryKey::Enabled => discovery.enabled.into(),
            DiscoveryKey::Port => i64::from(discovery.port).into(),
            DiscoveryKey::ServerId => i64::from(discovery.server_id).into(),
            DiscoveryKey::OffboardIp => discovery.offboard_ip.clone().into(),
            DiscoveryKey::OffboardPort => i64::from(discovery.offboard_port).into(),
            DiscoveryKey::OffboardId => i64::from(discovery.offboard_id).into(),
        }
    }

    fn set_system(&mut self, key: ConfigKey, field: SystemKey, value: &ConfigValue) -> Result<SetOutcome> {
        let slot = match field {
            SystemKey::Model => &mut self.system.model,
            SystemKey::Version => &mut self.system.version,
            SystemKey::Ros => &mut self.system.ros,
            SystemKey::Hostname => &mut self.system.hostname,
            SystemKey::Ip => return Ok(SetOutcome::Rejected(format!("{} is read-only", key))),
        };

        let Some(text) = value.as_text() else {
            return Ok(SetOutcome::Rejected(format!("{} cannot be empty", key)));
        };
        *slot = text;
        Ok(SetOutcome::Applied)
    }

    fn set_wifi(&mut self, key: ConfigKey, field: WifiKey, value: &ConfigValue) -> Result<SetOutcome> {
        match field {
            WifiKey::Ssid => match value.as_text() {
                Some(ssid) => self.wifi.ssid = ssid,
                None => return Ok(SetOutcome::Rejected(format!("{} cannot be empty", key))),
            },
            WifiKey::Password => self.wifi.password = value.as_text(),
            WifiKey::RegDomain => match value.as_text() {
                Some(domain) => self.wifi.reg_domain = domain.to_uppercase(),
                None => return Ok(SetOutcome::Rejected(format!("{} cannot be empty", key))),
            },
            WifiKey::WifiMode => match value.as_text() {
                Some(mode) => self.wifi.mode = mode.parse()?,
                None => return Ok(SetOutcome::Rejected(format!("{} cannot be empty", key))),
            },
            WifiKey::Band => {
                self.wifi.band = value.as_text().map(|band| band.parse()).transpose()?;
            }
            WifiKey::Ip => self.wifi.ip = value.as_text(),
            WifiKey::Dhcp => self.wifi.dhcp = require_flag(key, value)?,
        }
        Ok(SetOutcome::Applied)
    }

    fn set_export(&mut self, key: ConfigKey, field: ExportKey, value: &ConfigValue) -> Result<SetOutcome> {
        match field {
            ExportKey::DomainId => {
                if value.as_text().is_none() {
                    self.export.set(field, None);
                    return Ok(SetOutcome::Applied);
                }
                let requested = require_number(key, value)?;
                let stored = clamp_domain_id(requested);
                self.export.set(field, Some(stored.to_string()));
                Ok(outcome(requested, stored))
            }
            ExportKey::Namespace => {
                let namespace = value.as_text().map(|ns| {
                    let ns = ns.trim().to_string();
                    if ns.starts_with('/') {
                        ns
                    } else {
                        format!("/{}", ns)
                    }
                });
                self.export.set(field, namespace);
                Ok(SetOutcome::Applied)
            }
            ExportKey::Diagnostics => {
                let enabled = require_flag(key, value)?;
                self.export.set(field, Some(if enabled { "1" } else { "0" }.to_string()));
                Ok(SetOutcome::Applied)
            }
            ExportKey::SuperClient => {
                let enabled = require_flag(key, value)?;
                let literal = if enabled { defaults::TRUE_LITERAL } else { defaults::FALSE_LITERAL };
                self.export.set(field, Some(literal.to_string()));
                Ok(SetOutcome::Applied)
            }
            _ => {
                self.export.set(field, value.as_text());
                Ok(SetOutcome::Applied)
            }
        }
    }

    fn set_discovery(&mut self, key: ConfigKey, field: DiscoveryKey, value: &ConfigValue) -> Result<SetOutcome> {
        match field {
            DiscoveryKey::Enabled => {
                self.discovery.enabled = require_flag(key, value)?;
                Ok(SetOutcome::Applied)
            }
            DiscoveryKey::OffboardIp => {
                self.discovery.offboard_ip = value.as_text().map(|ip| ip.trim().to_string());
                Ok(SetOutcome::Applied)
            }
            DiscoveryKey::Port | DiscoveryKey::OffboardPort => {
                let requested = require_number(key, value)?;
                let stored = clamp_discovery_port(requested);
                if field == DiscoveryKey::Port {
                    self.discovery.port = stored;
                } else {
                    self.discovery.offboard_port = stored;
                }
                Ok(outcome(requested, i64::from(stored)))
            }
            DiscoveryKey::ServerId | DiscoveryKey::OffboardId => {
                let requested = require_number(key, value)?;
                let stored = clamp_server_id(requested);
                let other = if field == DiscoveryKey::ServerId {
                    self.discovery.offboard_id
                } else {
                    self.discovery.server_id
                };
                if stored == other {
                    return Ok(SetOutcome::Rejected(format!(
                        "Local and offboard discovery servers cannot share ID {}",
                        stored
                    )));
                }
                if field == DiscoveryKey::ServerId {
                    self.discovery.server_id = stored;
                } else {
                    self.discovery.offboard_id = stored;
                }
                Ok(outcome(requested, i64::from(stored)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::categories::{WifiBand, WifiMode};

    #[test]
    fn test_domain_id_clamp() {
        assert_eq!(clamp_domain_id(-4), 0);
        assert_eq!(clamp_domain_id(42), 42);
        assert_eq!(clamp_domain_id(150), 101);
        assert_eq!(clamp_domain_id(220), 220);
        assert_eq!(clamp_domain_id(500), 232);

        let mut model = ConfigModel::new();
        let result = model.set(ExportKey::DomainId, 150).unwrap();
        assert_eq!(result, SetOutcome::Clamped { requested: 150, stored: 101 });
        assert_eq!(model.get(ExportKey::DomainId), ConfigValue::from("101"));
    }

    #[test]
    fn test_port_clamp() {
        let mut model = ConfigModel::new();
        model.set(DiscoveryKey::Port, 5).unwrap();
        assert_eq!(model.discovery.port, 10000);

        model.set(DiscoveryKey::OffboardPort, 70000).unwrap();
        assert_eq!(model.discovery.offboard_port, 65535);

        assert_eq!(model.set(DiscoveryKey::Port, "11900").unwrap(), SetOutcome::Applied);
        assert_eq!(model.discovery.port, 11900);
    }

    #[test]
    fn test_server_id_collision_is_rejected() {
        let mut model = ConfigModel::new();
        let before = model.clone();

        let result = model.set(DiscoveryKey::OffboardId, 0).unwrap();
        assert!(result.is_rejected());
        assert_eq!(model, before);

        let result = model.set(DiscoveryKey::ServerId, 1).unwrap();
        assert!(result.is_rejected());
        assert_eq!(model, before);

        assert_eq!(model.set(DiscoveryKey::ServerId, 300).unwrap(), SetOutcome::Clamped { requested: 300, stored: 255 });
        assert_eq!(model.discovery.server_id, 255);
    }

    #[test]
    fn test_apply_default_is_isolated() {
        let mut model = ConfigModel::new();
        model.set(SystemKey::Hostname, "robot-7").unwrap();
        model.set(WifiKey::Ssid, "Lab").unwrap();
        model.set(ExportKey::Namespace, "robot7").unwrap();
        model.set(DiscoveryKey::Enabled, true).unwrap();
        model.set(DiscoveryKey::Port, 11900).unwrap();

        let system = model.system.clone();
        let wifi = model.wifi.clone();
        let export = model.export.clone();

        model.apply_default(Category::Discovery);

        assert_eq!(model.discovery, DiscoveryConf::default());
        assert_eq!(model.system, system);
        assert_eq!(model.wifi, wifi);
        assert_eq!(model.export, export);
    }

    #[test]
    fn test_text_normalizations() {
        let mut model = ConfigModel::new();

        model.set(ExportKey::Namespace, "robot1").unwrap();
        assert_eq!(model.export.get(ExportKey::Namespace), Some("/robot1"));

        model.set(ExportKey::Namespace, "").unwrap();
        assert_eq!(model.export.get(ExportKey::Namespace), None);

        model.set(ExportKey::Diagnostics, "Disabled").unwrap();
        assert_eq!(model.export.get(ExportKey::Diagnostics), Some("0"));

        model.set(ExportKey::SuperClient, true).unwrap();
        assert!(model.export.super_client());

        model.set(WifiKey::WifiMode, "client").unwrap();
        assert_eq!(model.wifi.mode, WifiMode::Client);

        model.set(WifiKey::Band, "2.4GHz").unwrap();
        assert_eq!(model.wifi.band, Some(WifiBand::TwoPointFourGhz));

        model.set(WifiKey::Band, ConfigValue::Unset).unwrap();
        assert_eq!(model.wifi.band, None);
    }

    #[test]
    fn test_rejections_and_errors() {
        let mut model = ConfigModel::new();

        assert!(model.set(SystemKey::Ip, "10.0.0.2").unwrap().is_rejected());
        assert!(model.set(WifiKey::Ssid, "").unwrap().is_rejected());
        assert_eq!(model.wifi.ssid, "Turtlebot4");

        assert!(model.set(DiscoveryKey::Port, "eleven").is_err());
        assert!(model.set(WifiKey::Dhcp, "perhaps").is_err());
        assert!(model.set(WifiKey::WifiMode, "mesh").is_err());
    }

    #[test]
    fn test_get_typed_values() {
        let model = ConfigModel::new();
        assert_eq!(model.get(DiscoveryKey::Port), ConfigValue::Number(11811));
        assert_eq!(model.get(WifiKey::Dhcp), ConfigValue::Flag(true));
        assert_eq!(model.get(WifiKey::WifiMode), ConfigValue::from("Access Point"));
        assert_eq!(model.get(DiscoveryKey::OffboardIp), ConfigValue::Unset);
    }
}
