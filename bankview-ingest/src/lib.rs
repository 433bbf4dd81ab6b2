//! bankview-ingest: reading bank statement exports into records and writing reports back out.

pub mod parsers;
pub mod reader;
pub mod writer;

pub use reader::read_records;
pub use writer::{CsvReportSink, write_records};
