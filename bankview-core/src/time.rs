//! Time utilities: date parsing, calendar windows over records, greetings.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{Error, Result};
use crate::record::Transaction;

/// Format of `Дата операции` in the bank export.
pub const OPERATION_DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
/// Format of the instant a dashboard is requested for.
pub const REQUEST_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Format of the anchor date of a spending report.
pub const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_operation_date(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), OPERATION_DATE_FORMAT).map_err(|_| Error::MalformedDate {
        value: s.to_string(),
        expected: "DD.MM.YYYY HH:MM:SS",
    })
}

pub fn parse_request_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), REQUEST_DATETIME_FORMAT).map_err(|_| {
        Error::MalformedDate {
            value: s.to_string(),
            expected: "YYYY-MM-DD HH:MM:SS",
        }
    })
}

/// Parse a `YYYY-MM-DD` report anchor; the result sits at midnight.
pub fn parse_report_date(s: &str) -> Result<NaiveDateTime> {
    NaiveDate::parse_from_str(s.trim(), REPORT_DATE_FORMAT)
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| Error::MalformedDate {
            value: s.to_string(),
            expected: "YYYY-MM-DD",
        })
}

/// Records dated within `[anchor - months, anchor]`, both ends inclusive.
///
/// Month subtraction keeps the day of month where it exists and clamps to
/// the last day otherwise (31 May minus 3 months is 28/29 Feb).
pub fn rolling_months(
    records: &[Transaction],
    anchor: NaiveDateTime,
    months: u32,
) -> Result<Vec<Transaction>> {
    let start = anchor
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDateTime::MIN);
    within(records, start, anchor)
}

/// Records dated from the first day of the anchor's month (00:00:00) through
/// the anchor instant, inclusive.
pub fn month_to_date(records: &[Transaction], anchor: NaiveDateTime) -> Result<Vec<Transaction>> {
    let start = anchor
        .date()
        .with_day(1)
        .unwrap_or(anchor.date())
        .and_time(NaiveTime::MIN);
    within(records, start, anchor)
}

/// Every record must carry a parseable date, even ones outside the window.
fn within(
    records: &[Transaction],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Vec<Transaction>> {
    let dated = records
        .iter()
        .map(|txn| txn.operation_date().map(|dt| (dt, txn)))
        .collect::<Result<Vec<_>>>()?;

    Ok(dated
        .into_iter()
        .filter(|(dt, _)| *dt >= start && *dt <= end)
        .map(|(_, txn)| txn.clone())
        .collect())
}

/// Part of the day used to pick a greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPart {
    Morning,
    Day,
    Evening,
    Night,
}

impl DayPart {
    /// `[0,12)` morning, `[12,18)` day, `[18,21)` evening, `[21,24)` night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => DayPart::Morning,
            12..=17 => DayPart::Day,
            18..=20 => DayPart::Evening,
            _ => DayPart::Night,
        }
    }

    pub fn of(dt: NaiveDateTime) -> Self {
        Self::from_hour(dt.hour())
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            DayPart::Morning => "Доброе утро",
            DayPart::Day => "Добрый день",
            DayPart::Evening => "Добрый вечер",
            DayPart::Night => "Доброй ночи",
        }
    }
}
