//! Writing record sets back out as CSV reports.

use anyhow::{Context, Result, bail};
use bankview_core::{ReportSink, Transaction};
use chrono::Local;
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Write records as CSV. The header is the union of all columns in order of
/// first appearance; a record missing a column gets an empty cell.
pub fn write_records(path: impl AsRef<Path>, records: &[Transaction]) -> Result<()> {
    let path = path.as_ref();

    let mut headers: Vec<&str> = Vec::new();
    for txn in records {
        for column in txn.columns() {
            if !headers.contains(&column) {
                headers.push(column);
            }
        }
    }

    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    wtr.write_record(&headers)?;
    for txn in records {
        let row: Vec<String> = headers
            .iter()
            .map(|column| txn.get(column).map(ToString::to_string).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    wtr.flush()?;

    debug!(rows = records.len(), path = %path.display(), "report written");
    Ok(())
}

/// Persists reports as CSV files, either to a fixed path or to a
/// timestamped file inside a directory.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    output: Option<PathBuf>,
    dir: PathBuf,
}

impl CsvReportSink {
    /// Every report goes to `path`.
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        let output = path.into();
        let dir = output.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            output: Some(output),
            dir,
        }
    }

    /// Reports go to `<dir>/<name>_<YYYY_MM_DD_HHMM>_report.csv`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output: None,
            dir: dir.into(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => self.dir.join(format!(
                "{name}_{}_report.csv",
                Local::now().format("%Y_%m_%d_%H%M")
            )),
        }
    }
}

impl ReportSink for CsvReportSink {
    type Error = anyhow::Error;

    fn write_report(&self, name: &str, records: &[Transaction]) -> Result<()> {
        let path = self.path_for(name);
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
                bail!("report directory does not exist: {}", parent.display())
            }
            _ => {}
        }
        debug!(report = name, path = %path.display(), "saving report");
        write_records(&path, records)
    }
}
