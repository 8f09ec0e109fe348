//! Loosely typed values exchanged with the editing layer

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value read from or written to the model through `get`/`set`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Unset,
    Flag(bool),
    Number(i64),
    Text(String),
}

impl ConfigValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, ConfigValue::Unset)
    }

    /// Text form; numbers and flags are rendered, empty text counts as unset
    pub fn as_text(&self) -> Option<String> {
        match self {
            ConfigValue::Unset => None,
            ConfigValue::Flag(flag) => Some(flag.to_string()),
            ConfigValue::Number(n) => Some(n.to_string()),
            ConfigValue::Text(text) if text.trim().is_empty() => None,
            ConfigValue::Text(text) => Some(text.clone()),
        }
    }

    /// Integer form, accepting numeric text
    pub fn as_number(&self) -> Option<i64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            ConfigValue::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean form, accepting the spellings used by the menus and files
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ConfigValue::Flag(flag) => Some(*flag),
            ConfigValue::Number(0) => Some(false),
            ConfigValue::Number(1) => Some(true),
            ConfigValue::Text(text) => match text.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "enabled" => Some(true),
                "false" | "0" | "no" | "off" | "disabled" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Unset => Ok(()),
            ConfigValue::Flag(flag) => write!(f, "{}", flag),
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(text: &str) -> Self {
        ConfigValue::Text(text.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(text: String) -> Self {
        ConfigValue::Text(text)
    }
}

impl From<bool> for ConfigValue {
    fn from(flag: bool) -> Self {
        ConfigValue::Flag(flag)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        ConfigValue::Number(i64::from(n))
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ConfigValue::Unset, Into::into)
    }
}
