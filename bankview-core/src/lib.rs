//! bankview-core: transaction records, date windows and shared error types

pub mod error;
pub mod record;
pub mod sink;
pub mod time;

pub use error::{Error, Result};
pub use record::{FieldValue, Transaction, columns, transactions_from_json};
pub use sink::ReportSink;
pub use time::{
    DayPart, month_to_date, parse_operation_date, parse_report_date, parse_request_datetime,
    rolling_months,
};
