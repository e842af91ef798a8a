use std::fs;
use std::path::{Path, PathBuf};

use engine_logging::{engine_info, engine_warn};
use timeline_engine::CollectorSettings;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// `Ok(None)` when there is no settings file at `path`.
pub(crate) fn load_settings(path: &Path) -> Result<Option<CollectorSettings>, SettingsError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

pub(crate) fn load_or_default(path: &Path) -> CollectorSettings {
    match load_settings(path) {
        Ok(Some(settings)) => {
            engine_info!("Loaded collector settings from {:?}", path);
            settings
        }
        Ok(None) => CollectorSettings::default(),
        Err(err) => {
            engine_warn!("{}; using default settings", err);
            CollectorSettings::default()
        }
    }
}
