//! CSV statement exports.
//!
//! The bank exports either `,` or `;` separated files, with `,` as the decimal
//! separator in the `;` flavour:
//!   "Дата операции";"Номер карты";"Сумма операции";...
//!   "31.12.2021 16:44:00";"*7197";"-160,89";...

use anyhow::{Context, Result};
use bankview_core::{FieldValue, Transaction, columns};
use csv::ReaderBuilder;
use std::fs;
use std::path::Path;

pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("opening {}", path.display()))?;
    parse_csv_str(&text)
}

/// Parse CSV text with a header row. Cells of the known numeric columns
/// become numbers when they parse as such; everything else stays text.
pub fn parse_csv_str(text: &str) -> Result<Vec<Transaction>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let delimiter = detect_delimiter(text.lines().next().unwrap_or(""));

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut txns = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading row {}", idx + 2))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let txn = headers
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column.clone(), cell_value(column, cell)))
            .collect::<Transaction>();
        txns.push(txn);
    }

    Ok(txns)
}

fn cell_value(column: &str, cell: &str) -> FieldValue {
    let cell = cell.trim();
    if cell.is_empty() {
        return FieldValue::Empty;
    }
    if columns::is_numeric(column) {
        if let Some(value) = parse_number(cell) {
            return value;
        }
    }
    FieldValue::Text(cell.to_string())
}

/// "-160,89" → -160.89, "1 000" → 1000, "5" → 5
fn parse_number(s: &str) -> Option<FieldValue> {
    let normalized: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if let Ok(i) = normalized.parse::<i64>() {
        return Some(FieldValue::Int(i));
    }
    normalized.parse::<f64>().ok().map(FieldValue::Float)
}

fn detect_delimiter(header: &str) -> u8 {
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_semicolon_export() {
        let text = "\u{feff}\"Дата операции\";\"Номер карты\";\"Сумма платежа\";\"Кэшбэк\";\"Категория\";\"MCC\";\"Описание\"
\"31.12.2021 16:44:00\";\"*7197\";\"-160,89\";\"\";\"Супермаркеты\";\"5411\";\"Колхоз\"
\"31.12.2021 16:42:04\";\"*7197\";\"-64,00\";\"1\";\"Супермаркеты\";\"5411\";\"Колхоз\"
";
        let txns = parse_csv_str(text).unwrap();
        assert_eq!(txns.len(), 2);

        let first = &txns[0];
        assert_eq!(first.operation_date().unwrap().to_string(), "2021-12-31 16:44:00");
        assert_eq!(first.card_number(), Some("*7197"));
        assert_eq!(first.get(columns::PAYMENT_AMOUNT), Some(&FieldValue::Float(-160.89)));
        assert_eq!(first.get(columns::CASHBACK), Some(&FieldValue::Empty));
        assert_eq!(first.get(columns::MCC), Some(&FieldValue::Int(5411)));

        assert_eq!(txns[1].get(columns::PAYMENT_AMOUNT), Some(&FieldValue::Float(-64.0)));
        assert_eq!(txns[1].cashback(), Some(1.0));
    }

    #[test]
    fn test_text_columns_stay_text() {
        let text = "Описание,Сумма платежа\n12345,-100\n";
        let txns = parse_csv_str(text).unwrap();
        assert_eq!(txns[0].description(), Some("12345"));
        assert_eq!(txns[0].get(columns::PAYMENT_AMOUNT), Some(&FieldValue::Int(-100)));
    }

    #[test]
    fn test_unparseable_number_kept_as_text() {
        let text = "Сумма платежа\nn/a\n";
        let txns = parse_csv_str(text).unwrap();
        assert_eq!(txns[0].text(columns::PAYMENT_AMOUNT), Some("n/a"));
        assert_eq!(txns[0].payment_amount(), None);
    }

    #[test]
    fn test_skips_blank_rows_and_short_rows() {
        let text = "Описание,Категория\n,\nТакси\n";
        let txns = parse_csv_str(text).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description(), Some("Такси"));
        assert_eq!(txns[0].category(), None);
    }
}
