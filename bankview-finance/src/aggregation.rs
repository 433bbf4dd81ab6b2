//! Grouped totals: cashback per category for a month, spend per card.

use bankview_core::{Result, Transaction};
use chrono::Datelike;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Spend and cashback on one card.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CardStatistic {
    /// Card number with the masking stripped ("*7197" → "7197")
    pub last_digits: String,
    pub total_spent: f64,
    pub cashback: f64,
}

/// Category totals, largest first. Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals(Vec<(String, f64)>);

impl CategoryTotals {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, total)| (name.as_str(), *total))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, total) in &self.0 {
            map.serialize_entry(name, total)?;
        }
        map.end()
    }
}

/// Sum `Бонусы (включая кэшбэк)` per category over the records dated in the
/// given year and month, sorted by total descending. Categories with equal
/// totals keep the order they first appeared in.
///
/// Every record must carry a parseable `Дата операции`, in the month or not.
pub fn analyze_cashback(records: &[Transaction], year: i32, month: u32) -> Result<CategoryTotals> {
    debug!(year, month, rows = records.len(), "analyzing cashback");

    let dated = records
        .iter()
        .map(|txn| txn.operation_date().map(|dt| (dt, txn)))
        .collect::<Result<Vec<_>>>()?;

    let mut totals: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (dt, txn) in dated {
        if dt.year() != year || dt.month() != month {
            continue;
        }
        let Some(category) = txn.category() else {
            continue;
        };
        let bonus = txn.bonuses().unwrap_or(0.0);
        match index.get(category) {
            Some(&i) => totals[i].1 += bonus,
            None => {
                index.insert(category.to_string(), totals.len());
                totals.push((category.to_string(), bonus));
            }
        }
    }

    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    debug!(categories = totals.len(), "cashback analyzed");
    Ok(CategoryTotals(totals))
}

/// One entry per card that has expenses (`Сумма платежа` < 0), ordered by card
/// number. Income and records without a card are left out.
pub fn card_statistics(records: &[Transaction]) -> Vec<CardStatistic> {
    debug!(rows = records.len(), "calculating card statistics");

    let mut per_card: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for txn in records {
        if !txn.payment_amount().is_some_and(|amount| amount < 0.0) {
            continue;
        }
        let Some(card) = txn.card_number() else {
            continue;
        };
        let entry = per_card.entry(card).or_default();
        entry.0 += txn.operation_amount().unwrap_or(0.0);
        entry.1 += txn.cashback().unwrap_or(0.0);
    }

    let stats: Vec<CardStatistic> = per_card
        .into_iter()
        .map(|(card, (spent, cashback))| CardStatistic {
            last_digits: card.replace('*', ""),
            total_spent: spent.abs(),
            cashback,
        })
        .collect();

    debug!(cards = stats.len(), "card statistics done");
    stats
}
