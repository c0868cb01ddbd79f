use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use dashboard_core::PageKind;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes rendered pages to `{dir}/{page}.html`, replacing the file atomically
/// so a reader never sees a half-written page.
#[derive(Debug, Clone)]
pub struct PageWriter {
    dir: PathBuf,
}

impl PageWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, page: PageKind) -> PathBuf {
        self.dir.join(format!("{}.html", page.as_str()))
    }

    /// Returns `Ok(None)` when the file already holds exactly `content`.
    pub fn write(&self, page: PageKind, content: &str) -> Result<Option<PathBuf>, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.path_for(page);
        if fs::read_to_string(&target).is_ok_and(|existing| existing == content) {
            return Ok(None);
        }

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(Some(target))
    }
}
