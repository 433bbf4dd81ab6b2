//! Largest transactions by absolute payment amount.

use bankview_core::{FieldValue, Transaction, columns};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

pub const TOP_N: usize = 5;

/// Projection of a record shown on the main page.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopTransaction {
    pub date: FieldValue,
    pub amount: FieldValue,
    pub category: FieldValue,
    pub description: FieldValue,
}

impl TopTransaction {
    fn from_record(txn: &Transaction) -> Self {
        Self {
            date: field_or_blank(txn, columns::OPERATION_DATE),
            amount: field_or_blank(txn, columns::PAYMENT_AMOUNT),
            category: field_or_blank(txn, columns::CATEGORY),
            description: field_or_blank(txn, columns::DESCRIPTION),
        }
    }
}

/// The `TOP_N` records with the largest `|Сумма платежа|`. Records without a
/// numeric payment amount rank after all others; equal amounts keep their
/// input order.
pub fn filter_top_transactions(records: &[Transaction]) -> Vec<TopTransaction> {
    debug!(rows = records.len(), "filtering top transactions");

    let mut ranked: Vec<(Option<f64>, &Transaction)> = records
        .iter()
        .map(|txn| (txn.payment_amount().map(f64::abs), txn))
        .collect();
    ranked.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let top: Vec<TopTransaction> = ranked
        .into_iter()
        .take(TOP_N)
        .map(|(_, txn)| TopTransaction::from_record(txn))
        .collect();

    debug!(top = top.len(), "top transactions done");
    top
}

fn field_or_blank(txn: &Transaction, column: &str) -> FieldValue {
    txn.get(column)
        .cloned()
        .unwrap_or_else(|| FieldValue::Text(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(date: &str, amount: f64, category: &str) -> Transaction {
        Transaction::new()
            .with(columns::OPERATION_DATE, date)
            .with(columns::PAYMENT_AMOUNT, amount)
            .with(columns::CATEGORY, category)
            .with(columns::DESCRIPTION, format!("{category} shop"))
    }

    fn amounts(top: &[TopTransaction]) -> Vec<f64> {
        top.iter().filter_map(|t| t.amount.as_f64()).collect()
    }

    #[test]
    fn test_orders_by_absolute_amount() {
        let data = vec![
            txn("2024-01-01", -10.0, "Food"),
            txn("2024-01-02", -50.0, "Tech"),
            txn("2024-01-03", 30.0, "Salary"),
        ];
        let top = filter_top_transactions(&data);
        assert_eq!(amounts(&top), vec![-50.0, 30.0, -10.0]);
        assert_eq!(top[0].category, FieldValue::Text("Tech".into()));
        assert_eq!(top[0].date, FieldValue::Text("2024-01-02".into()));
    }

    #[test]
    fn test_at_most_five_non_increasing() {
        let data: Vec<_> = [-1.0, 7.0, -3.0, 12.0, -9.0, 4.0, -15.0, 2.0]
            .iter()
            .enumerate()
            .map(|(i, a)| txn(&format!("d{i}"), *a, "Any"))
            .collect();
        let top = filter_top_transactions(&data);
        assert_eq!(top.len(), TOP_N);
        let abs: Vec<f64> = amounts(&top).iter().map(|a| a.abs()).collect();
        assert!(abs.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(abs, vec![15.0, 12.0, 9.0, 7.0, 4.0]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let data = vec![
            txn("first", -20.0, "A"),
            txn("second", 20.0, "B"),
            txn("third", -20.0, "C"),
        ];
        let top = filter_top_transactions(&data);
        let dates: Vec<_> = top.iter().map(|t| t.date.to_string()).collect();
        assert_eq!(dates, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_missing_fields_blank_and_missing_amount_last() {
        let data = vec![
            Transaction::new().with(columns::DESCRIPTION, "no amount"),
            txn("2024-01-01", -1.0, "Food"),
        ];
        let top = filter_top_transactions(&data);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].amount, FieldValue::Float(-1.0));
        assert_eq!(top[1].amount, FieldValue::Text(String::new()));
        assert_eq!(top[1].date, FieldValue::Text(String::new()));
        assert_eq!(top[1].description, FieldValue::Text("no amount".into()));
    }

    #[test]
    fn test_empty() {
        assert!(filter_top_transactions(&[]).is_empty());
    }
}
