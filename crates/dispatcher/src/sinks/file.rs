//! Write-once file output

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{DispatcherError, Result};

/// What to do when the target path already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Fail with `AlreadyExists`
    #[default]
    CreateNew,
    /// Atomically replace through a sibling temp file
    Replace,
}

impl WriteMode {
    pub fn from_force(force: bool) -> Self {
        if force {
            Self::Replace
        } else {
            Self::CreateNew
        }
    }
}

/// Write `contents` to `path` in one go, creating parent directories.
///
/// Contents are fully built before this is called; a failed write never
/// leaves a partial file behind.
pub fn write_file(path: &Path, contents: &[u8], mode: WriteMode) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DispatcherError::io(parent, e))?;
    }

    match mode {
        WriteMode::CreateNew => create_new(path, contents)?,
        WriteMode::Replace => replace(path, contents)?,
    }

    debug!(path = %path.display(), bytes = contents.len(), mode = ?mode, "file written");
    Ok(())
}

fn create_new(path: &Path, contents: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => DispatcherError::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => DispatcherError::io(path, e),
        })?;

    if let Err(e) = file.write_all(contents).and_then(|_| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(DispatcherError::io(path, e));
    }
    Ok(())
}

fn replace(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| DispatcherError::io(dir, e))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| DispatcherError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| DispatcherError::io(path, e.error))?;
    Ok(())
}
