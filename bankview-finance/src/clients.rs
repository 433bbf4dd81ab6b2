//! HTTP clients for the currency and stock services.
//!
//! Requests run on tokio through reqwest; the service traits are synchronous,
//! so each call is bridged with `block_on`. Response handling is kept in
//! plain functions over `(status, body)`.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tracing::{debug, error};

use crate::market::{CurrencyRate, CurrencyRateService, StockEntry, StockPriceService};

pub const CBR_DAILY_URL: &str = "https://www.cbr-xml-daily.ru/daily_json.js";
pub const MARKETSTACK_EOD_URL: &str = "http://api.marketstack.com/v2/eod";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Daily rates of the Central Bank of Russia.
#[derive(Debug, Clone)]
pub struct CbrRates {
    url: String,
}

impl CbrRates {
    pub fn new() -> Self {
        Self::with_url(CBR_DAILY_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    async fn fetch_rate(&self, code: &str) -> Result<CurrencyRate> {
        debug!(url = %self.url, code, "requesting currency rate");
        let resp = http_client()?
            .get(&self.url)
            .send()
            .await
            .context("currency rate request")?;

        let status = resp.status();
        let body = resp.text().await.context("read currency rate response")?;
        let rate = rate_from_response(status, &body, code)?;
        debug!(code, rate = rate.rate, "currency rate received");
        Ok(rate)
    }
}

impl Default for CbrRates {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrencyRateService for CbrRates {
    fn get_rate(&self, code: &str) -> Result<CurrencyRate> {
        block_on(self.fetch_rate(code))
    }
}

#[derive(Deserialize)]
struct CbrDaily {
    #[serde(rename = "Valute")]
    valute: HashMap<String, CbrValute>,
}

#[derive(Deserialize)]
struct CbrValute {
    #[serde(rename = "Value")]
    value: f64,
}

/// Pick `code` out of a CBR daily rates document.
pub fn rate_from_response(status: StatusCode, body: &str, code: &str) -> Result<CurrencyRate> {
    if !status.is_success() {
        bail!("Failed to get currency rate: {status}");
    }

    let daily: CbrDaily = serde_json::from_str(body).context("parse currency rate response")?;
    let Some(valute) = daily.valute.get(code) else {
        bail!("No data for currency {code}");
    };

    Ok(CurrencyRate {
        currency_code: code.to_string(),
        rate: valute.value,
    })
}

/// End-of-day stock prices from Marketstack.
#[derive(Debug, Clone)]
pub struct Marketstack {
    url: String,
    api_key: String,
}

impl Marketstack {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_url(MARKETSTACK_EOD_URL, api_key)
    }

    pub fn with_url(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    async fn fetch_prices(&self, tickers: &[String]) -> Result<Vec<StockEntry>> {
        let symbols = tickers.join(",");
        debug!(url = %self.url, %symbols, "requesting stock prices");

        let resp = http_client()?
            .get(&self.url)
            .query(&[("access_key", self.api_key.as_str()), ("symbols", symbols.as_str())])
            .send()
            .await
            .context("stock price request")?;

        let status = resp.status();
        let body = resp.text().await.context("read stock price response")?;
        let entries = prices_from_response(status, &body)?;
        debug!(rows = entries.len(), "stock prices received");
        Ok(entries)
    }
}

impl StockPriceService for Marketstack {
    fn get_prices(&self, tickers: &[String]) -> Result<Vec<StockEntry>> {
        block_on(self.fetch_prices(tickers))
    }
}

#[derive(Deserialize)]
struct EodResponse {
    #[serde(default)]
    data: Vec<StockEntry>,
}

/// The `data` rows of an end-of-day response, or nothing when the status is
/// not a success.
pub fn prices_from_response(status: StatusCode, body: &str) -> Result<Vec<StockEntry>> {
    if !status.is_success() {
        error!(%status, "error getting stock prices");
        return Ok(Vec::new());
    }

    let eod: EodResponse = serde_json::from_str(body).context("parse stock price response")?;
    Ok(eod.data)
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("build http client")
}

/// Run a request future to completion from synchronous code.
///
/// A multi-threaded runtime (the CLI runs under `#[tokio::main]`) is reused
/// via `block_in_place`. A current-thread runtime cannot block in place, so
/// the request gets its own runtime on a scoped thread. Outside any runtime
/// a fresh one is created here.
fn block_on<F, T>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send,
    T: Send,
{
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| handle.block_on(fut))
        }
        Ok(_) => std::thread::scope(|s| match s.spawn(move || run_fresh(fut)).join() {
            Ok(result) => result,
            Err(_) => Err(anyhow!("request thread panicked")),
        }),
        Err(_) => run_fresh(fut),
    }
}

fn run_fresh<F, T>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let rt = Runtime::new().context("create tokio runtime")?;
    rt.block_on(fut)
}
