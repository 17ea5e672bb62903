// CSV export of displayed rows.
//
// Header is the active schema's labels in order; each body row carries the
// raw (unformatted) field values. Quoting follows standard CSV rules.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::columns::ColumnSpec;
use super::record::StatRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to finish CSV buffer: {0}")]
    Buffer(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Encode `records` under `columns` as CSV bytes.
pub fn write_csv(columns: &ColumnSpec, records: &[StatRecord]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(columns.labels())?;
    for record in records {
        writer.write_record(columns.raw_row(record))?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.error().to_string()))
}

/// Write CSV bytes to `path`, creating parent directories as needed.
pub fn save(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
