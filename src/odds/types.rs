//! Best-price table types produced by aggregation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::catalog::{MarketKey, OutcomeKey};

/// Best available quote for one outcome across allowed bookmakers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPrice {
    /// Bookmaker offering the price.
    pub bookmaker: String,
    /// Decimal odds.
    pub price: Decimal,
    /// American odds equivalent (0 when the price carries no payout).
    pub american_odds: i64,
    /// When the bookmaker last updated the quote.
    #[serde(with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
}

/// Best prices per outcome for one market.
pub type OutcomePrices = BTreeMap<OutcomeKey, BestPrice>;

/// One event after cross-bookmaker reduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEvent {
    /// Feed identifier.
    pub id: String,
    /// Display label: "League: Home vs Away".
    pub label: String,
    /// Scheduled start (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub commence_time: OffsetDateTime,
    /// Best prices by market, then outcome.
    pub markets: BTreeMap<MarketKey, OutcomePrices>,
}

impl AggregatedEvent {
    /// Best prices for a market, if any allowed bookmaker quoted it.
    pub fn market(&self, key: &str) -> Option<&OutcomePrices> {
        self.markets.get(&MarketKey::new(key))
    }
}

/// Aggregated catalog keyed by event id.
pub type BestPriceTable = BTreeMap<String, AggregatedEvent>;
