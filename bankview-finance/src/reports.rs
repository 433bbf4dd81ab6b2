//! Spending reports and their persistence.

use bankview_core::time::REQUEST_DATETIME_FORMAT;
use bankview_core::{
    ReportSink, Result, Transaction, columns, parse_report_date, rolling_months,
};
use chrono::{Local, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::search::search_transactions;

/// Length of the spending report window.
pub const SPENDING_WINDOW_MONTHS: u32 = 3;

/// Records of the last three months up to `date` (`YYYY-MM-DD`, midnight;
/// today when `None`) whose category matches `category`.
///
/// `category` is a regex, searched in `Категория` only. Returned records have
/// `Дата операции` rewritten as `YYYY-MM-DD HH:MM:SS`.
pub fn spending_by_category(
    records: &[Transaction],
    category: &str,
    date: Option<&str>,
) -> Result<Vec<Transaction>> {
    let anchor = match date {
        Some(d) => parse_report_date(d)?,
        None => Local::now().date_naive().and_time(NaiveTime::MIN),
    };
    debug!(category, %anchor, rows = records.len(), "spending by category");

    let window = rolling_months(records, anchor, SPENDING_WINDOW_MONTHS)?
        .into_iter()
        .map(with_iso_date)
        .collect::<Result<Vec<_>>>()?;

    search_transactions(&window, category, &[columns::CATEGORY])
}

fn with_iso_date(mut txn: Transaction) -> Result<Transaction> {
    let dt = txn.operation_date()?;
    txn.insert(columns::OPERATION_DATE, iso(dt));
    Ok(txn)
}

fn iso(dt: NaiveDateTime) -> String {
    dt.format(REQUEST_DATETIME_FORMAT).to_string()
}

/// Compute a report, hand it to `sink`, and return it.
///
/// ```ignore
/// let rows = save_report(&sink, "spending_by_category", || {
///     spending_by_category(&records, "Переводы", Some("2021-12-19"))
/// })?;
/// ```
pub fn save_report<S, F, E>(sink: &S, name: &str, compute: F) -> anyhow::Result<Vec<Transaction>>
where
    S: ReportSink,
    anyhow::Error: From<S::Error> + From<E>,
    F: FnOnce() -> std::result::Result<Vec<Transaction>, E>,
{
    let records = compute()?;
    debug!(report = name, rows = records.len(), "saving report");
    sink.write_report(name, &records)?;
    Ok(records)
}
