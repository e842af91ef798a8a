//! Export folder handling. Files land under their final name only once fully
//! written and synced.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_debug;
use tempfile::Builder;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0} exists and is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot create export folder {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("export file name {0:?} must be a bare file name")]
    BadFileName(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A folder that receives exports. Opening it creates it when missing.
#[derive(Debug, Clone)]
pub struct ExportDir {
    root: PathBuf,
}

impl ExportDir {
    pub fn open(root: &Path) -> Result<Self, PersistError> {
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(PersistError::NotADirectory(root.to_path_buf())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(root).map_err(|source| PersistError::CreateDir {
                    path: root.to_path_buf(),
                    source,
                })?;
                engine_debug!("Created export folder {:?}", root);
            }
            Err(e) => return Err(PersistError::Io(e)),
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Writes `contents` as `file_name`, replacing an export of the same day.
    pub fn replace(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, PersistError> {
        if file_name.is_empty() || Path::new(file_name).file_name() != Some(file_name.as_ref()) {
            return Err(PersistError::BadFileName(file_name.to_string()));
        }
        let target = self.root.join(file_name);

        let mut staged = Builder::new()
            .prefix(".partial-")
            .suffix(".csv")
            .tempfile_in(&self.root)?;
        staged.write_all(contents)?;
        staged.as_file_mut().sync_all()?;
        staged.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
