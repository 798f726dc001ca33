//! Output file writing.

use std::fs;
use std::path::Path;

use crate::error::{MigrenderError, MigrenderResult};

/// Join `lines` with newlines and write them to `path`, creating parent
/// directories and overwriting any existing file.
pub fn write_lines(lines: &[String], path: &Path) -> MigrenderResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MigrenderError::io(parent, e))?;
    }
    fs::write(path, lines.join("\n")).map_err(|e| MigrenderError::io(path, e))
}
