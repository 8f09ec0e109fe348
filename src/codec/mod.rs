//! Codecs translating the configuration model to and from its files
//!
//! Each codec offers a pure `parse`/`render` pair working on text plus thin
//! `read`/`write` wrappers that touch the filesystem. The orchestrator uses the
//! pure halves so that every file can be rendered before any is replaced.

pub mod atomic;
pub mod discovery;
pub mod export;
pub mod launcher;
pub mod netplan;
pub mod system;

pub use atomic::{write_atomic, write_executable};
pub use discovery::{LocalServer, RemoteServer, Topology};
pub use export::{ExportLineStyle, ExportMapping};
pub use netplan::WifiFields;
pub use system::SystemFields;

use crate::error::{AppError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Read a whole file, reporting absence as `None`
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::io(format!("Failed to read '{}': {}", path.display(), e))),
    }
}

/// Read a whole file, reporting absence as a missing-source error
pub fn read_required(path: &Path) -> Result<String> {
    read_optional(path)?
        .ok_or_else(|| AppError::missing_source(format!("'{}' does not exist", path.display())))
}

/// Strip surrounding whitespace and single or double quotes
pub(crate) fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}
