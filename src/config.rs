//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;
use time::UtcOffset;

use crate::arbitrage::validate_threshold;
use crate::selection::{load_allow_list, AllowList};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Odds Feed ===
    /// API key for the odds feed.
    #[serde(default)]
    pub odds_api_key: Option<String>,

    /// Odds API base URL.
    #[serde(default = "default_odds_api_url")]
    pub odds_api_url: String,

    /// Sport to query ("upcoming" covers every sport).
    #[serde(default = "default_sport_key")]
    pub sport_key: String,

    /// Bookmaker regions, comma-separated.
    #[serde(default = "default_regions")]
    pub regions: String,

    /// Markets to request, comma-separated.
    #[serde(default = "default_markets")]
    pub markets: String,

    /// HTTP timeout for feed requests.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Bookmaker Selection ===
    /// Allowed bookmaker keys (BOOKMAKERS=fanduel,draftkings).
    #[serde(default)]
    pub bookmakers: Vec<String>,

    /// File with one bookmaker key per line.
    #[serde(default)]
    pub bookmakers_file: Option<PathBuf>,

    // === Scan Parameters ===
    /// Budget split across each opportunity's outcomes.
    #[serde(default = "default_total_stake")]
    pub total_stake: Decimal,

    /// Markets qualify only below this total inverse price (0 < x <= 1).
    #[serde(default = "default_max_total_inverse")]
    pub max_total_inverse: Decimal,

    // === Presentation ===
    /// Hours east of UTC used when printing times.
    #[serde(default)]
    pub display_utc_offset_hours: i8,

    /// Log output format: "text" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_odds_api_url() -> String {
    "https://api.the-odds-api.com/v4".to_string()
}

fn default_sport_key() -> String {
    "upcoming".to_string()
}

fn default_regions() -> String {
    "us,us2".to_string()
}

fn default_markets() -> String {
    "h2h,totals".to_string()
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_total_stake() -> Decimal {
    Decimal::ONE_HUNDRED // $100
}

fn default_max_total_inverse() -> Decimal {
    Decimal::ONE
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            odds_api_key: None,
            odds_api_url: default_odds_api_url(),
            sport_key: default_sport_key(),
            regions: default_regions(),
            markets: default_markets(),
            http_timeout_ms: default_http_timeout_ms(),
            bookmakers: Vec::new(),
            bookmakers_file: None,
            total_stake: default_total_stake(),
            max_total_inverse: default_max_total_inverse(),
            display_utc_offset_hours: 0,
            log_format: default_log_format(),
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.total_stake <= Decimal::ZERO {
            return Err("TOTAL_STAKE must be greater than 0".to_string());
        }

        if validate_threshold(self.max_total_inverse).is_err() {
            return Err("MAX_TOTAL_INVERSE must be in (0, 1]".to_string());
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        if !(-12..=14).contains(&self.display_utc_offset_hours) {
            return Err("DISPLAY_UTC_OFFSET_HOURS must be between -12 and 14".to_string());
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err("LOG_FORMAT must be \"text\" or \"json\"".to_string());
        }

        if let Err(e) = url::Url::parse(&self.odds_api_url) {
            return Err(format!("ODDS_API_URL is not a valid URL: {e}"));
        }

        Ok(())
    }

    /// Allow-list named by configuration, if any.
    ///
    /// `BOOKMAKERS` wins over `BOOKMAKERS_FILE`. `None` means the caller
    /// picks a fallback.
    pub fn configured_allow_list(&self) -> Option<AllowList> {
        let inline: AllowList = self.bookmakers.iter().map(String::as_str).collect();
        if !inline.is_empty() {
            return Some(inline);
        }

        self.bookmakers_file.as_ref().map(load_allow_list)
    }

    /// UTC offset used for displayed times.
    pub fn display_offset(&self) -> UtcOffset {
        UtcOffset::from_hms(self.display_utc_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC)
    }

    /// Whether logs should be emitted as JSON.
    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}
