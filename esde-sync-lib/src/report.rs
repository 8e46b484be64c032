//! Audit CSV export.

use std::fs;
use std::io::Write;
use std::path::Path;

use esde_sync_core::report::{CSV_HEADER, CsvRow};

use crate::error::SyncError;

/// Serialize rows to CSV text, header first.
pub fn render_audit_csv<W: Write>(writer: W, rows: &[CsvRow]) -> Result<(), SyncError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the audit CSV to `path`, creating parent folders.
pub fn write_audit_csv(path: &Path, rows: &[CsvRow]) -> Result<(), SyncError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SyncError::write_failure(parent, e))?;
    }
    let file = fs::File::create(path).map_err(|e| SyncError::write_failure(path, e))?;
    render_audit_csv(file, rows)
}
