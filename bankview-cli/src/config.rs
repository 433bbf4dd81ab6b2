//! User settings: which stocks and currencies the main page follows.
//!
//! Read from `user_settings.json` by default; a `.toml` file works too.
//!
//! ```json
//! {
//!   "user_currencies": ["USD", "EUR"],
//!   "user_stocks": ["AAPL", "AMZN", "GOOGL", "MSFT", "TSLA"]
//! }
//! ```

use anyhow::{Context, Result, bail};
use bankview_finance::UserSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MARKETSTACK_KEY_ENV: &str = "MARKETSTACK_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(flatten)]
    pub user: UserSettings,
    /// Used when `MARKETSTACK_API_KEY` is not set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketstack_api_key: Option<String>,
}

impl Settings {
    /// The environment wins over the file.
    pub fn marketstack_api_key(&self) -> Option<String> {
        std::env::var(MARKETSTACK_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.marketstack_api_key.clone())
    }
}

pub fn default_settings_path() -> PathBuf {
    PathBuf::from("user_settings.json")
}

pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.is_file() {
        bail!("settings file not found: {}", path.display());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
    let settings = if is_toml {
        toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?
    } else {
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?
    };
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_settings.json");
        fs::write(
            &path,
            r#"{"user_currencies": ["USD", "EUR"], "user_stocks": ["AAPL", "TSLA"]}"#,
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.user.user_currencies, vec!["USD", "EUR"]);
        assert_eq!(settings.user.user_stocks, vec!["AAPL", "TSLA"]);
        assert_eq!(settings.marketstack_api_key, None);
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "user_currencies = [\"USD\"]\nuser_stocks = []\nmarketstack_api_key = \"k\"\n",
        )
        .unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.user.user_currencies, vec!["USD"]);
        assert!(settings.user.user_stocks.is_empty());
        assert_eq!(settings.marketstack_api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(&dir.path().join("missing.json")).is_err());

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_settings(&path).is_err());
    }
}
