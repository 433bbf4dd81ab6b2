//! Destination for computed reports.

use crate::record::Transaction;

/// Persists a computed record set. `name` identifies the report that
/// produced the records and may be used to derive a file name.
pub trait ReportSink {
    type Error;

    fn write_report(&self, name: &str, records: &[Transaction]) -> Result<(), Self::Error>;
}
