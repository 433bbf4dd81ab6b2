//! Format dispatch for statement files.

use anyhow::{Context, Result, bail};
use bankview_core::Transaction;
use std::path::Path;
use tracing::debug;

use crate::parsers::{read_csv, read_xlsx};

/// Read a statement export into records, one per row, columns named by the
/// header row. The format is picked from the file extension.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    if !path.is_file() {
        bail!("statement not found: {}", path.display());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let records = match ext.as_str() {
        "csv" => read_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => read_xlsx(path),
        other => bail!("unsupported statement format '{other}': {}", path.display()),
    }
    .with_context(|| format!("reading {}", path.display()))?;

    debug!(rows = records.len(), path = %path.display(), "statement loaded");
    Ok(records)
}
