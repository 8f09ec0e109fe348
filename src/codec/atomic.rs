//! Temp-file-then-move replacement of persisted files

use crate::error::{AppError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const FILE_MODE: u32 = 0o644;
const EXECUTABLE_MODE: u32 = 0o755;

/// Replace `path` with `contents`, never leaving a truncated file behind
///
/// The temp file is created next to the target so the final rename stays on
/// one filesystem. An existing file keeps its permissions.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    replace(path, contents, FILE_MODE)
}

/// Same as [`write_atomic`] for scripts; new files are made executable
pub fn write_executable(path: &Path, contents: &str) -> Result<()> {
    replace(path, contents, EXECUTABLE_MODE)
}

fn replace(path: &Path, contents: &str, new_file_mode: u32) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
        .map_err(|e| AppError::io(format!("Failed to create '{}': {}", parent.display(), e)))?;

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| AppError::io(format!("Failed to create temporary file in '{}': {}", parent.display(), e)))?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;

    let permissions = match fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_permissions(new_file_mode),
    };
    if let Some(permissions) = permissions {
        fs::set_permissions(temp.path(), permissions)?;
    }

    temp.persist(path)
        .map_err(|e| AppError::io(format!("Failed to replace '{}': {}", path.display(), e.error)))?;
    Ok(())
}

#[cfg(unix)]
fn new_permissions(mode: u32) -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn new_permissions(_mode: u32) -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_file_and_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("turtlebot4").join("setup.bash");

        write_atomic(&path, "export ROS_DOMAIN_ID=\"0\"\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "export ROS_DOMAIN_ID=\"0\"\n");
    }

    #[test]
    fn test_write_replaces_existing_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hostname");
        fs::write(&path, "old-name\nwith extra lines\n").unwrap();

        write_atomic(&path, "turtlebot4").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "turtlebot4");

        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();

        let script = dir.path().join("discovery.sh");
        write_executable(&script, "#!/bin/bash\n").unwrap();
        assert_eq!(fs::metadata(&script).unwrap().permissions().mode() & 0o777, 0o755);

        let existing = dir.path().join("system");
        fs::write(&existing, "MODEL:lite\n").unwrap();
        fs::set_permissions(&existing, fs::Permissions::from_mode(0o600)).unwrap();
        write_atomic(&existing, "MODEL:standard\n").unwrap();
        assert_eq!(fs::metadata(&existing).unwrap().permissions().mode() & 0o777, 0o600);
    }
}
