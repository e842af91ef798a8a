use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use engine_logging::engine_info;
use timeline_core::{build_csv, csv_filename, CollectedItem};

use crate::persist::{ExportDir, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// Writes `tweets_YYYY-MM-DD.csv` into `output_dir` and returns its path.
pub fn write_csv_export(
    output_dir: &Path,
    items: &[CollectedItem],
    extraction_date: NaiveDate,
) -> Result<PathBuf, ExportError> {
    if items.is_empty() {
        return Err(ExportError::Empty);
    }
    let csv = build_csv(items, extraction_date);
    let path = ExportDir::open(output_dir)?.replace(&csv_filename(extraction_date), csv.as_bytes())?;
    engine_info!("Exported {} items to {:?}", items.len(), path);
    Ok(path)
}
