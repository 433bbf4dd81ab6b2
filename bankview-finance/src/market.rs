//! Market data: currency rates and stock quotes, and the service seams
//! the main page pulls them through.
//!
//! The two services fail differently. A currency lookup is an error when the
//! upstream is down or does not know the code. A stock lookup that gets a
//! non-success status answers with an empty list instead, so "no data" and
//! "upstream failed" look the same to the caller.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyRate {
    pub currency_code: String,
    pub rate: f64,
}

/// One end-of-day row as the stock provider returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockEntry {
    pub symbol: String,
    #[serde(default)]
    pub price_currency: String,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Price shown on the main page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockQuote {
    pub stock: String,
    pub price: f64,
}

pub trait CurrencyRateService {
    /// Current rate for an ISO currency code. Errors when the upstream is
    /// unreachable, answers with a non-success status, or lacks the code.
    fn get_rate(&self, code: &str) -> Result<CurrencyRate>;
}

pub trait StockPriceService {
    /// Latest rows for `tickers`. A non-success upstream status yields
    /// `Ok(vec![])`; only transport or decoding problems are errors.
    fn get_prices(&self, tickers: &[String]) -> Result<Vec<StockEntry>>;
}

/// First USD-priced row per requested ticker, priced at the row's high.
/// Rows without a high are passed over.
pub fn filter_last_stocks(entries: &[StockEntry], tickers: &[String]) -> Vec<StockQuote> {
    debug!(rows = entries.len(), ?tickers, "filtering last stocks");

    let mut seen: HashSet<&str> = HashSet::new();
    let quotes: Vec<StockQuote> = entries
        .iter()
        .filter(|e| e.price_currency == "USD" && tickers.contains(&e.symbol))
        .filter_map(|e| e.high.map(|price| (e, price)))
        .filter(|(e, _)| seen.insert(e.symbol.as_str()))
        .map(|(e, price)| StockQuote {
            stock: e.symbol.clone(),
            price,
        })
        .collect();

    debug!(quotes = quotes.len(), "last stocks filtered");
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(symbol: &str, currency: &str, high: f64) -> StockEntry {
        StockEntry {
            symbol: symbol.into(),
            price_currency: currency.into(),
            high: Some(high),
            close: None,
            date: None,
        }
    }

    fn tickers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_usd_match_wins() {
        let data = vec![
            entry("AAPL", "USD", 150.0),
            entry("AAPL", "EUR", 999.0),
            entry("MSFT", "USD", 300.0),
            entry("AAPL", "USD", 200.0),
        ];
        let result = filter_last_stocks(&data, &tickers(&["AAPL", "MSFT"]));
        assert_eq!(
            result,
            vec![
                StockQuote { stock: "AAPL".into(), price: 150.0 },
                StockQuote { stock: "MSFT".into(), price: 300.0 },
            ]
        );
    }

    #[test]
    fn test_non_usd_skipped_before_usd_row() {
        let data = vec![entry("SAP", "EUR", 120.0), entry("SAP", "USD", 130.0)];
        let result = filter_last_stocks(&data, &tickers(&["SAP"]));
        assert_eq!(result, vec![StockQuote { stock: "SAP".into(), price: 130.0 }]);
    }

    #[test]
    fn test_unrequested_tickers_dropped() {
        let data = vec![entry("TSLA", "USD", 1000.0)];
        assert!(filter_last_stocks(&data, &tickers(&["AAPL"])).is_empty());
    }

    #[test]
    fn test_row_without_high_passed_over() {
        let mut unpriced = entry("AAPL", "USD", 0.0);
        unpriced.high = None;
        let data = vec![unpriced, entry("MSFT", "USD", 300.0), entry("AAPL", "USD", 151.0)];
        let result = filter_last_stocks(&data, &tickers(&["AAPL", "MSFT"]));
        assert_eq!(
            result,
            vec![
                StockQuote { stock: "MSFT".into(), price: 300.0 },
                StockQuote { stock: "AAPL".into(), price: 151.0 },
            ]
        );
    }

    #[test]
    fn test_entry_decodes_provider_row() {
        let row = r#"{"open":129.8,"high":133.04,"low":129.47,"close":132.995,
            "volume":106686703.0,"symbol":"AAPL","exchange":"XNAS",
            "price_currency":"USD","date":"2021-04-09T00:00:00+0000"}"#;
        let e: StockEntry = serde_json::from_str(row).unwrap();
        assert_eq!(e.symbol, "AAPL");
        assert_eq!(e.high, Some(133.04));
        assert_eq!(e.close, Some(132.995));
        assert_eq!(e.price_currency, "USD");
    }
}
