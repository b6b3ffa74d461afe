use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::{PrepError, Result};
use crate::transform::OutputRecord;

/// Writes all records as one pretty-printed JSON array (2-space indent),
/// replacing any existing file. Returns the number of records written.
pub fn write_output(path: &Path, records: &[OutputRecord]) -> Result<usize> {
    let write_err = |source: std::io::Error| PrepError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(write_err)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| write_err(e.into()))?;
    writer.flush().map_err(write_err)?;

    info!(records = records.len(), "Wrote {}", path.display());
    Ok(records.len())
}
