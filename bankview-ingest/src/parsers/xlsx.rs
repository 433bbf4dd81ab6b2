//! Excel/ODS statement exports: first worksheet, first row is the header.

use anyhow::{Result, anyhow};
use bankview_core::time::OPERATION_DATE_FORMAT;
use bankview_core::{FieldValue, Transaction};
use calamine::{Data, DataType, Reader, open_workbook_auto};
use std::path::Path;
use tracing::warn;

pub fn read_xlsx(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| anyhow!("opening {}: {e}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook has no worksheets"))?
        .map_err(|e| anyhow!("reading first worksheet: {e}"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string().trim().to_string()).collect();

    let mut txns = Vec::new();
    for (idx, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }

        let txn = headers
            .iter()
            .zip(row.iter())
            .map(|(column, cell)| {
                if let Data::Error(e) = cell {
                    warn!(row = idx + 2, column = %column, error = ?e, "cell error, treating as empty");
                }
                (column.clone(), cell_value(cell))
            })
            .collect::<Transaction>();
        txns.push(txn);
    }

    Ok(txns)
}

fn cell_value(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty | Data::Error(_) => FieldValue::Empty,
        Data::String(s) if s.trim().is_empty() => FieldValue::Empty,
        Data::String(s) => FieldValue::Text(s.trim().to_string()),
        Data::Int(i) => FieldValue::Int(*i),
        Data::Float(f) => FieldValue::Float(*f),
        Data::Bool(b) => FieldValue::Bool(*b),
        // Date cells are rendered back into the export's text format so the
        // record looks the same whichever file type it came from.
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => FieldValue::Text(dt.format(OPERATION_DATE_FORMAT).to_string()),
            None => FieldValue::Text(cell.to_string()),
        },
        Data::DurationIso(s) => FieldValue::Text(s.clone()),
    }
}
