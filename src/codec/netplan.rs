//! Netplan description of the `wlan0` wireless interface

use super::atomic::write_atomic;
use super::read_optional;
use crate::defaults;
use crate::error::{AppError, Result};
use crate::models::{WifiBand, WifiConf, WifiMode};
use serde_yaml::{Mapping, Value};
use std::path::Path;

const INTERFACE: &str = "wlan0";
const RENDERER: &str = "NetworkManager";

/// Wi-Fi fields persisted in netplan; the regulatory domain is not among them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiFields {
    pub ssid: String,
    pub password: Option<String>,
    pub mode: WifiMode,
    pub band: Option<WifiBand>,
    pub ip: Option<String>,
    pub dhcp: bool,
}

impl From<&WifiConf> for WifiFields {
    fn from(conf: &WifiConf) -> Self {
        Self {
            ssid: conf.ssid.clone(),
            password: conf.password.clone(),
            mode: conf.mode,
            band: conf.band,
            ip: conf.ip.clone(),
            dhcp: conf.dhcp,
        }
    }
}

impl WifiFields {
    /// Copy into a model record, leaving the regulatory domain alone
    pub fn apply_to(self, conf: &mut WifiConf) {
        conf.ssid = self.ssid;
        conf.password = self.password;
        conf.mode = self.mode;
        conf.band = self.band;
        conf.ip = self.ip;
        conf.dhcp = self.dhcp;
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Netplan accepts the YAML 1.1 boolean spellings, which YAML 1.2 reads as strings
fn flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "on" | "y"),
        _ => false,
    }
}

/// Extract the interface fields; `Ok(None)` when there is no `wlan0` access point
pub fn parse(yaml: &str) -> Result<Option<WifiFields>> {
    parse_lenient(yaml).map(|(fields, _)| fields)
}

/// Like [`parse`], also returning the fields that fell back to their default
///
/// A malformed document is still an error. A single unreadable field only
/// resets that field.
pub fn parse_lenient(yaml: &str) -> Result<(Option<WifiFields>, Vec<AppError>)> {
    let document: Value = serde_yaml::from_str(yaml)?;
    let mut fallbacks = Vec::new();

    let Some(wlan0) = document
        .get("network")
        .and_then(|network| network.get("wifis"))
        .and_then(|wifis| wifis.get(INTERFACE))
    else {
        return Ok((None, fallbacks));
    };

    let Some((ssid, settings)) = wlan0
        .get("access-points")
        .and_then(Value::as_mapping)
        .and_then(|points| points.iter().next())
    else {
        return Ok((None, fallbacks));
    };

    let Some(ssid) = text(ssid) else {
        return Err(AppError::parse("Access point name is not a scalar"));
    };

    let ip = wlan0
        .get("addresses")
        .and_then(Value::as_sequence)
        .and_then(|addresses| addresses.first())
        .and_then(text);

    let dhcp = wlan0.get("dhcp4").map(flag).unwrap_or(false);

    let mode = match settings.get("mode").and_then(Value::as_str) {
        Some("ap") => WifiMode::AccessPoint,
        _ => WifiMode::Client,
    };

    let band = match settings.get("band").and_then(text) {
        Some(band) if !band.is_empty() => band.parse::<WifiBand>().unwrap_or_else(|_| {
            fallbacks.push(AppError::parse(format!("Unknown Wi-Fi band '{}'", band)));
            WifiBand::Any
        }),
        _ => WifiBand::Any,
    };

    let fields = WifiFields {
        ssid,
        password: settings.get("password").and_then(text),
        mode,
        band: Some(band),
        ip,
        dhcp,
    };
    Ok((Some(fields), fallbacks))
}

/// Render the full file, header comment included
pub fn render(fields: &WifiFields) -> Result<String> {
    let mut access_point = Mapping::new();
    if let Some(password) = &fields.password {
        access_point.insert(key("password"), key(password));
    }
    if fields.mode == WifiMode::AccessPoint {
        access_point.insert(key("mode"), key("ap"));
    }
    if let Some(band) = fields.band.filter(|band| *band != WifiBand::Any) {
        access_point.insert(key("band"), key(band.as_str()));
    }

    let mut access_points = Mapping::new();
    access_points.insert(key(&fields.ssid), Value::Mapping(access_point));

    let mut wlan0 = Mapping::new();
    wlan0.insert(key("dhcp4"), Value::Bool(fields.dhcp));
    wlan0.insert(key("access-points"), Value::Mapping(access_points));
    if let Some(ip) = &fields.ip {
        wlan0.insert(key("addresses"), Value::Sequence(vec![key(ip)]));
    }

    let mut wifis = Mapping::new();
    wifis.insert(key("renderer"), key(RENDERER));
    wifis.insert(key(INTERFACE), Value::Mapping(wlan0));

    let mut network = Mapping::new();
    network.insert(key("version"), Value::Number(2.into()));
    network.insert(key("wifis"), Value::Mapping(wifis));

    let mut root = Mapping::new();
    root.insert(key("network"), Value::Mapping(network));

    let body = serde_yaml::to_string(&Value::Mapping(root))?;
    Ok(format!("{}\n\n{}", defaults::GENERATED_FILE_NOTICE, body))
}

/// Read the interface fields; an absent file yields `Ok(None)`
pub fn read(path: &Path) -> Result<Option<WifiFields>> {
    read_lenient(path).map(|(fields, _)| fields)
}

pub fn read_lenient(path: &Path) -> Result<(Option<WifiFields>, Vec<AppError>)> {
    match read_optional(path)? {
        Some(yaml) => parse_lenient(&yaml),
        None => Ok((None, Vec::new())),
    }
}

pub fn write(path: &Path, fields: &WifiFields) -> Result<()> {
    write_atomic(path, &render(fields)?)
}
