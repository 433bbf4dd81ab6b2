//! Main page: greeting, card totals, top transactions, stock prices and
//! currency rates for the month so far.
//!
//! Only a malformed request time or record date fails the page. Market data
//! degrades instead: a failed stock lookup leaves the stock list empty, and
//! each failed currency lookup drops just that currency.

use bankview_core::{DayPart, Result, Transaction, month_to_date, parse_request_datetime};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::aggregation::{CardStatistic, card_statistics};
use crate::market::{
    CurrencyRate, CurrencyRateService, StockPriceService, StockQuote, filter_last_stocks,
};
use crate::ranking::{TopTransaction, filter_top_transactions};

/// What the user wants to follow on the main page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserSettings {
    #[serde(default)]
    pub user_stocks: Vec<String>,
    #[serde(default)]
    pub user_currencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MainPage {
    pub greeting: String,
    pub cards: Vec<CardStatistic>,
    pub top_transaction: Vec<TopTransaction>,
    pub stock_prices: Vec<StockQuote>,
    pub currency_rates: Vec<CurrencyRate>,
}

impl MainPage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Build the main page for the instant `at` (`YYYY-MM-DD HH:MM:SS`).
pub fn main_page(
    records: &[Transaction],
    at: &str,
    settings: &UserSettings,
    stocks: &dyn StockPriceService,
    rates: &dyn CurrencyRateService,
) -> Result<MainPage> {
    let at = parse_request_datetime(at)?;
    debug!(
        %at,
        stocks = ?settings.user_stocks,
        currencies = ?settings.user_currencies,
        "building main page"
    );

    let greeting = DayPart::of(at).greeting().to_string();

    let month = month_to_date(records, at)?;
    let cards = card_statistics(&month);
    let top_transaction = filter_top_transactions(&month);

    let stock_prices = match stocks.get_prices(&settings.user_stocks) {
        Ok(entries) => filter_last_stocks(&entries, &settings.user_stocks),
        Err(e) => {
            error!("Error getting stocks data: {e:#}");
            Vec::new()
        }
    };

    let currency_rates = settings
        .user_currencies
        .iter()
        .filter_map(|code| match rates.get_rate(code) {
            Ok(rate) => Some(rate),
            Err(e) => {
                error!("Error getting currency rate {code}: {e:#}");
                None
            }
        })
        .collect();

    let page = MainPage {
        greeting,
        cards,
        top_transaction,
        stock_prices,
        currency_rates,
    };
    debug!(
        cards = page.cards.len(),
        top = page.top_transaction.len(),
        stocks = page.stock_prices.len(),
        currencies = page.currency_rates.len(),
        "main page built"
    );
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::StockEntry;
    use anyhow::bail;
    use bankview_core::columns;

    struct NoStocks;

    impl StockPriceService for NoStocks {
        fn get_prices(&self, _tickers: &[String]) -> anyhow::Result<Vec<StockEntry>> {
            Ok(Vec::new())
        }
    }

    struct FixedRate(f64);

    impl CurrencyRateService for FixedRate {
        fn get_rate(&self, code: &str) -> anyhow::Result<CurrencyRate> {
            if code.len() != 3 {
                bail!("No data for currency {code}");
            }
            Ok(CurrencyRate {
                currency_code: code.to_string(),
                rate: self.0,
            })
        }
    }

    fn txn(date: &str, card: &str, amount: f64) -> Transaction {
        Transaction::new()
            .with(columns::OPERATION_DATE, date)
            .with(columns::CARD_NUMBER, card)
            .with(columns::OPERATION_AMOUNT, amount)
            .with(columns::PAYMENT_AMOUNT, amount)
            .with(columns::CASHBACK, 0)
            .with(columns::CATEGORY, "Супермаркеты")
            .with(columns::DESCRIPTION, "Магнит")
    }

    #[test]
    fn test_greeting_and_month_window() {
        let records = vec![
            txn("30.04.2020 12:00:00", "*1111", -999.0),
            txn("05.05.2020 12:00:00", "*1111", -100.0),
            txn("20.05.2020 18:00:00", "*2222", -50.0),
            txn("21.05.2020 09:00:00", "*2222", -700.0),
        ];
        let settings = UserSettings::default();
        let page = main_page(&records, "2020-05-20 18:20:00", &settings, &NoStocks, &FixedRate(1.0))
            .unwrap();

        assert_eq!(page.greeting, "Добрый вечер");
        assert_eq!(
            page.cards
                .iter()
                .map(|c| (c.last_digits.as_str(), c.total_spent))
                .collect::<Vec<_>>(),
            vec![("1111", 100.0), ("2222", 50.0)]
        );
        assert_eq!(page.top_transaction.len(), 2);
        assert!(page.stock_prices.is_empty());
        assert!(page.currency_rates.is_empty());
    }

    #[test]
    fn test_bad_request_time() {
        let settings = UserSettings::default();
        assert!(main_page(&[], "20.05.2020 18:20", &settings, &NoStocks, &FixedRate(1.0)).is_err());
    }

    #[test]
    fn test_json_shape() {
        let settings = UserSettings {
            user_stocks: vec![],
            user_currencies: vec!["USD".into()],
        };
        let page = main_page(&[], "2020-05-20 08:00:00", &settings, &NoStocks, &FixedRate(75.5))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&page.to_json().unwrap()).unwrap();
        assert_eq!(value["greeting"], "Доброе утро");
        assert_eq!(value["cards"], serde_json::json!([]));
        assert_eq!(value["top_transaction"], serde_json::json!([]));
        assert_eq!(value["stock_prices"], serde_json::json!([]));
        assert_eq!(
            value["currency_rates"],
            serde_json::json!([{"currency_code": "USD", "rate": 75.5}])
        );
    }
}
