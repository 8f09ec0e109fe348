//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// The persisted files managed by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// `KEY:value` robot identity file
    System,
    /// `/etc/hostname`
    Hostname,
    /// Netplan Wi-Fi description
    Netplan,
    /// Discovery server launcher script
    Launcher,
    /// `setup.bash` export file
    Export,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::System => "system",
            FileKind::Hostname => "hostname",
            FileKind::Netplan => "netplan",
            FileKind::Launcher => "discovery launcher",
            FileKind::Export => "setup.bash",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered file contents waiting to be committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
    pub kind: FileKind,
    pub path: PathBuf,
    pub contents: String,
}

impl PendingWrite {
    pub fn new(kind: FileKind, path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            kind,
            path: path.into(),
            contents,
        }
    }
}
