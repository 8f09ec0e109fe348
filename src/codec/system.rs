//! Robot identity files: the `KEY:value` system file and `/etc/hostname`

use super::atomic::write_atomic;
use super::read_required;
use crate::defaults;
use crate::error::Result;
use crate::models::{SystemConf, SystemKey};
use std::path::Path;
use std::process::Command;

/// Keys persisted in the system file, in file order
pub const PERSISTED_KEYS: [SystemKey; 3] = [SystemKey::Model, SystemKey::Version, SystemKey::Ros];

/// Values found in the system file; missing lines stay `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemFields {
    pub model: Option<String>,
    pub version: Option<String>,
    pub ros: Option<String>,
}

impl SystemFields {
    pub fn apply_to(self, conf: &mut SystemConf) {
        if let Some(model) = self.model {
            conf.model = model;
        }
        if let Some(version) = self.version {
            conf.version = version;
        }
        if let Some(ros) = self.ros {
            conf.ros = ros;
        }
    }
}

fn line_key(line: &str) -> Option<(SystemKey, &str)> {
    let (name, value) = line.split_once(':')?;
    let key = PERSISTED_KEYS
        .iter()
        .copied()
        .find(|key| name.trim() == key.as_str())?;
    Some((key, value))
}

fn persisted_value(conf: &SystemConf, key: SystemKey) -> &str {
    match key {
        SystemKey::Model => &conf.model,
        SystemKey::Version => &conf.version,
        _ => &conf.ros,
    }
}

pub fn parse(text: &str) -> SystemFields {
    let mut fields = SystemFields::default();
    for line in text.lines() {
        if let Some((key, value)) = line_key(line) {
            let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
            match key {
                SystemKey::Model => fields.model = value,
                SystemKey::Version => fields.version = value,
                _ => fields.ros = value,
            }
        }
    }
    fields
}

/// Patch the `MODEL`, `VERSION` and `ROS` lines, appending any that are missing
pub fn render(existing: &str, conf: &SystemConf) -> String {
    let mut seen = Vec::new();
    let mut out = String::with_capacity(existing.len() + 32);

    for line in existing.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        match line_key(content) {
            Some((key, _)) => {
                out.push_str(&format!("{}:{}", key, persisted_value(conf, key)));
                out.push_str(&line[content.len()..]);
                seen.push(key);
            }
            None => out.push_str(line),
        }
    }

    for key in PERSISTED_KEYS.iter().filter(|key| !seen.contains(*key)) {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("{}:{}\n", key, persisted_value(conf, *key)));
    }

    out
}

/// First line of the hostname file
pub fn parse_hostname(text: &str) -> Option<String> {
    text.lines()
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// Hostname file contents; written bare, without a line terminator
pub fn render_hostname(conf: &SystemConf) -> String {
    conf.hostname.clone()
}

pub fn read(path: &Path) -> Result<SystemFields> {
    Ok(parse(&read_required(path)?))
}

pub fn read_hostname(path: &Path) -> Result<Option<String>> {
    Ok(parse_hostname(&read_required(path)?))
}

/// Patch the system file in place and rewrite the hostname file
pub fn write(system_path: &Path, hostname_path: &Path, conf: &SystemConf) -> Result<()> {
    let existing = super::read_optional(system_path)?.unwrap_or_default();
    write_atomic(system_path, &render(&existing, conf))?;
    write_atomic(hostname_path, &render_hostname(conf))
}

/// Keep the addresses reported by `hostname -I` minus the Create 3 USB link
pub fn filter_addresses(output: &str) -> Option<String> {
    let addresses: Vec<&str> = output
        .split_whitespace()
        .filter(|address| *address != defaults::COMPANION_LINK_ADDRESS)
        .collect();
    if addresses.is_empty() {
        None
    } else {
        Some(addresses.join(" "))
    }
}

/// Current addresses of the robot, or `None` if they cannot be determined
pub fn detect_ip() -> Option<String> {
    let output = Command::new("hostname").arg("-I").output().ok()?;
    if !output.status.success() {
        return None;
    }
    filter_addresses(&String::from_utf8_lossy(&output.stdout))
}
