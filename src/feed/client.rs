//! Odds API client.

use std::time::{Duration, Instant};

use tracing::{debug, instrument};
use url::Url;

use crate::config::Config;
use crate::error::FeedError;
use crate::metrics;

/// Longest response body kept in a status error.
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for an Odds API v4 style endpoint.
#[derive(Debug, Clone)]
pub struct OddsApiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL (e.g. https://api.the-odds-api.com/v4).
    base_url: String,
    /// API key, if configured.
    api_key: Option<String>,
    /// Sport key.
    sport: String,
    /// Bookmaker regions.
    regions: String,
    /// Requested markets.
    markets: String,
}

impl OddsApiClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            http,
            base_url: config.odds_api_url.clone(),
            api_key: config.odds_api_key.clone(),
            sport: config.sport_key.clone(),
            regions: config.regions.clone(),
            markets: config.markets.clone(),
        })
    }

    /// Build the odds endpoint URL.
    pub fn odds_url(&self) -> Result<Url, FeedError> {
        let api_key = self.api_key.as_deref().ok_or(FeedError::MissingApiKey)?;

        let mut url = Url::parse(&format!(
            "{}/sports/{}/odds",
            self.base_url.trim_end_matches('/'),
            self.sport
        ))?;
        url.query_pairs_mut()
            .append_pair("apiKey", api_key)
            .append_pair("regions", &self.regions)
            .append_pair("markets", &self.markets)
            .append_pair("oddsFormat", "decimal");

        Ok(url)
    }

    /// Fetch the current odds document as raw JSON text.
    #[instrument(skip(self), fields(sport = %self.sport))]
    pub async fn fetch_odds(&self) -> Result<String, FeedError> {
        let url = self.odds_url()?;
        let start = Instant::now();

        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        metrics::record_feed_fetch_latency(start);

        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        debug!(bytes = body.len(), "Fetched odds feed");
        Ok(body)
    }
}
