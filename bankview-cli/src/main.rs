use anyhow::{Context, Result};
use bankview_core::Transaction;
use bankview_finance::search::DEFAULT_SCOPE;
use bankview_finance::{
    CbrRates, Marketstack, analyze_cashback, main_page, save_report, search_transactions,
    search_transactions_by_phone, search_transactions_p2p, spending_by_category,
};
use bankview_ingest::{CsvReportSink, read_records};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod config;

#[derive(Parser, Debug)]
#[command(
    name = "bankview",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BANKVIEW_BUILD_SHA"), ")"),
    about = "Summaries, searches and reports over a bank statement export"
)]
struct Cli {
    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Main page JSON: greeting, cards, top transactions, stocks, currency rates
    MainPage {
        /// Statement export (.xlsx or .csv)
        #[arg(long)]
        input: PathBuf,

        /// Instant to build the page for, "YYYY-MM-DD HH:MM:SS" (default: now)
        #[arg(long)]
        at: Option<String>,

        /// Settings file with user_stocks and user_currencies
        #[arg(long, default_value_os_t = config::default_settings_path())]
        settings: PathBuf,
    },

    /// Transactions whose columns match a regex
    Search {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        pattern: String,

        /// Column to search; repeat for several (default: Описание, Категория)
        #[arg(long = "scope")]
        scope: Vec<String>,
    },

    /// Transfers to private persons
    P2p {
        #[arg(long)]
        input: PathBuf,
    },

    /// Transactions mentioning a mobile number
    Phones {
        #[arg(long)]
        input: PathBuf,
    },

    /// Cashback per category for one month
    Cashback {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        year: i32,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
    },

    /// Three months of spending in a category, saved as a CSV report
    Spending {
        #[arg(long)]
        input: PathBuf,

        /// Category pattern
        #[arg(long)]
        category: String,

        /// Last day of the window, "YYYY-MM-DD" (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Report file (default: a timestamped file in --report-dir)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, default_value = "data")]
        report_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.log_level);
    debug!("Log level set to {}", cli.log_level.to_string().to_lowercase());

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::MainPage {
            input,
            at,
            settings,
        } => {
            let records = load(&input)?;
            let settings = config::load_settings(&settings)?;
            let at = at.unwrap_or_else(|| Local::now().format("%Y-%m-%d %H:%M:%S").to_string());

            let api_key = settings.marketstack_api_key().unwrap_or_else(|| {
                warn!(
                    "{} is not set; stock prices will be empty",
                    config::MARKETSTACK_KEY_ENV
                );
                String::new()
            });
            let stocks = Marketstack::new(api_key);
            let rates = CbrRates::new();

            let page = main_page(&records, &at, &settings.user, &stocks, &rates)?;
            println!("{}", page.to_json()?);
        }

        Command::Search {
            input,
            pattern,
            scope,
        } => {
            let records = load(&input)?;
            let scope: Vec<&str> = if scope.is_empty() {
                DEFAULT_SCOPE.to_vec()
            } else {
                scope.iter().map(String::as_str).collect()
            };
            print_json(&search_transactions(&records, &pattern, &scope)?)?;
        }

        Command::P2p { input } => {
            let records = load(&input)?;
            print_json(&search_transactions_p2p(&records)?)?;
        }

        Command::Phones { input } => {
            let records = load(&input)?;
            print_json(&search_transactions_by_phone(&records)?)?;
        }

        Command::Cashback { input, year, month } => {
            let records = load(&input)?;
            print_json(&analyze_cashback(&records, year, month)?)?;
        }

        Command::Spending {
            input,
            category,
            date,
            output,
            report_dir,
        } => {
            let records = load(&input)?;
            let sink = match output {
                Some(path) => CsvReportSink::to_file(path),
                None => CsvReportSink::in_dir(report_dir),
            };
            let rows = save_report(&sink, "spending_by_category", || {
                spending_by_category(&records, &category, date.as_deref())
            })?;
            print_json(&rows)?;
        }
    }

    Ok(())
}

fn load(input: &Path) -> Result<Vec<Transaction>> {
    read_records(input).with_context(|| format!("loading {}", input.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}

/// Logs go to stderr so stdout stays clean JSON.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!(
            "bankview={level},bankview_core={level},bankview_ingest={level},bankview_finance={level}"
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
