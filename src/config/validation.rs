//! Consistency checks over the configuration model
//!
//! The editing layer keeps individual fields in range; these checks look at
//! combinations of fields that are legal but probably not what the user
//! wants, e.g. an access point without a password.

use crate::defaults;
use crate::models::{clamp_domain_id, ConfigModel, ExportKey, WifiMode};
use colored::Colorize;
use serde::Serialize;
use std::net::IpAddr;

/// Model validator with advanced validation rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run every check
    pub fn validate_comprehensive(model: &ConfigModel) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        warnings.extend(Self::validate_wifi(model));
        warnings.extend(Self::validate_export(model));
        warnings.extend(Self::validate_discovery(model));

        warnings
    }

    fn validate_wifi(model: &ConfigModel) -> Vec<ValidationWarning> {
        let wifi = &model.wifi;
        let mut warnings = Vec::new();

        match (&wifi.ip, wifi.dhcp) {
            (Some(ip), true) => warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("DHCP is enabled together with static address {}", ip),
            )),
            (None, false) => warnings.push(ValidationWarning::new(
                ValidationLevel::Error,
                "Neither DHCP nor a static address is configured; wlan0 will have no address".to_string(),
            )),
            _ => {}
        }

        if let Some(ip) = &wifi.ip {
            match ip.split_once('/') {
                Some((address, prefix)) => {
                    if address.parse::<IpAddr>().is_err() {
                        warnings.push(ValidationWarning::new(
                            ValidationLevel::Error,
                            format!("Static address '{}' is not an IP address", address),
                        ));
                    }
                    if prefix.parse::<u8>().map_or(true, |p| p > 128) {
                        warnings.push(ValidationWarning::new(
                            ValidationLevel::Error,
                            format!("Static address '{}' has an invalid prefix length", ip),
                        ));
                    }
                }
                None => warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Static address '{}' has no prefix length, e.g. {}/24", ip, ip),
                )),
            }
        }

        if wifi.mode == WifiMode::AccessPoint && wifi.password.is_none() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Access point '{}' has no password and is open to anyone in range", wifi.ssid),
            ));
        }

        if let Some(password) = &wifi.password {
            if password.len() < 8 {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    "Wi-Fi password is shorter than the 8 characters WPA2 requires".to_string(),
                ));
            }
        }

        warnings
    }

    fn validate_export(model: &ConfigModel) -> Vec<ValidationWarning> {
        let export = &model.export;
        let mut warnings = Vec::new();

        match export.domain_id() {
            Some(Ok(id)) if clamp_domain_id(id) != id => warnings.push(ValidationWarning::new(
                ValidationLevel::Error,
                format!("ROS_DOMAIN_ID {} is outside 0-101 and 215-232", id),
            )),
            Some(Err(_)) => warnings.push(ValidationWarning::new(
                ValidationLevel::Error,
                format!(
                    "ROS_DOMAIN_ID '{}' is not a number",
                    export.get(ExportKey::DomainId).unwrap_or_default()
                ),
            )),
            _ => {}
        }

        if let Some(namespace) = export.get(ExportKey::Namespace) {
            if !namespace.starts_with('/') {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("ROBOT_NAMESPACE '{}' should start with '/'", namespace),
                ));
            }
        }

        if let Some(rmw) = export.get(ExportKey::Rmw) {
            if rmw != defaults::RMW_FASTRTPS && rmw != defaults::RMW_CYCLONEDDS {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("RMW_IMPLEMENTATION '{}' is not one of the supported middlewares", rmw),
                ));
            }
        }

        warnings
    }

    fn validate_discovery(model: &ConfigModel) -> Vec<ValidationWarning> {
        let discovery = &model.discovery;
        let mut warnings = Vec::new();

        if !discovery.enabled {
            return warnings;
        }

        if let Some(ip) = &discovery.offboard_ip {
            if ip.parse::<IpAddr>().is_err() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Error,
                    format!("Offboard discovery server '{}' is not an IP address", ip),
                ));
            }
        }

        let rmw = model.export.get(ExportKey::Rmw).unwrap_or_default();
        if rmw != defaults::RMW_FASTRTPS {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Discovery server requires {}; RMW_IMPLEMENTATION '{}' will be replaced on write",
                    defaults::RMW_FASTRTPS,
                    rmw
                ),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone, Serialize)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if !use_color {
            return format!("{} {}", tag, self.message);
        }

        let tag = match self.level {
            ValidationLevel::Info => tag.blue(),
            ValidationLevel::Warning => tag.yellow(),
            ValidationLevel::Error => tag.red().bold(),
        };
        format!("{} {}", tag, self.message)
    }
}

/// Convenience function for comprehensive model validation
pub fn validate_config(model: &ConfigModel) -> Vec<ValidationWarning> {
    ConfigValidator::validate_comprehensive(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiscoveryKey, WifiKey};

    fn messages(model: &ConfigModel) -> Vec<String> {
        validate_config(model).into_iter().map(|w| w.message).collect()
    }

    #[test]
    fn test_default_model_is_clean() {
        assert!(validate_config(&ConfigModel::default()).is_empty());
    }

    #[test]
    fn test_dhcp_and_static_address() {
        let mut model = ConfigModel::default();
        model.set(WifiKey::Ip, "192.168.0.12/24").unwrap();
        let warnings = validate_config(&model);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Warning);

        model.set(WifiKey::Dhcp, false).unwrap();
        model.set(WifiKey::Ip, "").unwrap();
        assert!(messages(&model).iter().any(|m| m.contains("Neither DHCP")));
    }

    #[test]
    fn test_static_address_without_prefix() {
        let mut model = ConfigModel::default();
        model.set(WifiKey::Dhcp, false).unwrap();
        model.set(WifiKey::Ip, "192.168.0.12").unwrap();
        assert!(messages(&model).iter().any(|m| m.contains("no prefix length")));

        model.set(WifiKey::Ip, "192.168.0.12/99x").unwrap();
        assert!(messages(&model).iter().any(|m| m.contains("invalid prefix")));
    }

    #[test]
    fn test_open_access_point() {
        let mut model = ConfigModel::default();
        model.set(WifiKey::Password, "").unwrap();
        assert!(messages(&model).iter().any(|m| m.contains("no password")));

        model.set(WifiKey::WifiMode, "Client").unwrap();
        assert!(messages(&model).is_empty());
    }

    #[test]
    fn test_domain_id_and_namespace_from_file() {
        let mut model = ConfigModel::default();
        // Values read from disk bypass the editing layer
        model.export.set(ExportKey::DomainId, Some("150".to_string()));
        model.export.set(ExportKey::Namespace, Some("robot1".to_string()));
        let found = messages(&model);
        assert!(found.iter().any(|m| m.contains("outside 0-101")));
        assert!(found.iter().any(|m| m.contains("should start with '/'")));

        model.export.set(ExportKey::DomainId, Some("abc".to_string()));
        assert!(messages(&model).iter().any(|m| m.contains("not a number")));
    }

    #[test]
    fn test_discovery_checks() {
        let mut model = ConfigModel::default();
        model.set(DiscoveryKey::Enabled, true).unwrap();
        model.set(DiscoveryKey::OffboardIp, "not-an-ip").unwrap();
        model.set(ExportKey::Rmw, "rmw_cyclonedds_cpp").unwrap();

        let warnings = validate_config(&model);
        assert!(warnings.iter().any(|w| w.level == ValidationLevel::Error && w.message.contains("not-an-ip")));
        assert!(warnings.iter().any(|w| w.message.contains("will be replaced on write")));
    }

    #[test]
    fn test_format_without_color() {
        let warning = ValidationWarning::new(ValidationLevel::Error, "broken".to_string());
        assert_eq!(warning.format(false), "[ERROR] broken");
    }
}
