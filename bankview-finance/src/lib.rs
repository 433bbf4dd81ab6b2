//! bankview-finance: search, aggregation and ranking over bank transactions,
//! market data lookups, the spending report and the main page composer

pub mod aggregation;
pub mod clients;
pub mod dashboard;
pub mod market;
pub mod ranking;
pub mod reports;
pub mod search;

pub use aggregation::{CardStatistic, CategoryTotals, analyze_cashback, card_statistics};
pub use clients::{CbrRates, Marketstack};
pub use dashboard::{MainPage, UserSettings, main_page};
pub use market::{
    CurrencyRate, CurrencyRateService, StockEntry, StockPriceService, StockQuote,
    filter_last_stocks,
};
pub use ranking::{TopTransaction, filter_top_transactions};
pub use reports::{save_report, spending_by_category};
pub use search::{search_transactions, search_transactions_by_phone, search_transactions_p2p};
