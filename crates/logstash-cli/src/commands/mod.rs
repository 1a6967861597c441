//! CLI commands

use std::path::Path;

use crate::{Error, Result};

pub mod diff_pipelines;
pub mod render;

/// Read a whole file as UTF-8
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Write `content` to `path`, creating parent directories as needed
pub fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| Error::io(path, e))
}
