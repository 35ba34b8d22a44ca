//! Validated event catalog types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use time::OffsetDateTime;

/// Market key as quoted by the feed (`h2h`, `totals`, `spreads`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MarketKey(String);

impl MarketKey {
    /// Create a market key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MarketKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Identity of an outcome within a market.
///
/// The point value is part of the identity, so "Over 5.5" and "Over 6.5"
/// in the same `totals` market never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutcomeKey {
    /// Participant name, or "Over"/"Under".
    pub name: String,
    /// Line value for totals/spreads outcomes.
    pub point: Option<Decimal>,
}

impl OutcomeKey {
    /// Outcome without a line (head-to-head).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            point: None,
        }
    }

    /// Outcome on a line.
    pub fn with_point(name: impl Into<String>, point: Decimal) -> Self {
        Self {
            name: name.into(),
            point: Some(point),
        }
    }
}

impl fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.point {
            Some(point) => write!(f, "{} {}", self.name, point.normalize()),
            None => f.write_str(&self.name),
        }
    }
}

// Serialized as its display form so it can key JSON objects.
impl Serialize for OutcomeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One priced outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Outcome identity.
    pub key: OutcomeKey,
    /// Decimal odds.
    pub price: Decimal,
}

impl Outcome {
    /// Create an outcome.
    pub fn new(key: OutcomeKey, price: Decimal) -> Self {
        Self { key, price }
    }
}

/// One market as quoted by one bookmaker.
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    /// Market key.
    pub key: MarketKey,
    /// Quoted outcomes.
    pub outcomes: Vec<Outcome>,
}

/// All markets quoted by one bookmaker for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmakerQuote {
    /// Bookmaker key (e.g. "fanduel").
    pub key: String,
    /// When the bookmaker last updated these prices.
    pub last_update: OffsetDateTime,
    /// Quoted markets.
    pub markets: Vec<Market>,
}

/// A scheduled sporting event with every bookmaker's quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Feed identifier.
    pub id: String,
    /// League name (e.g. "NBA").
    pub sport_title: String,
    /// Home participant.
    pub home_team: String,
    /// Away participant.
    pub away_team: String,
    /// Scheduled start (UTC).
    pub commence_time: OffsetDateTime,
    /// Bookmaker quotes in feed order.
    pub bookmakers: Vec<BookmakerQuote>,
}

impl Event {
    /// Display label: "League: Home vs Away".
    pub fn label(&self) -> String {
        format!("{}: {} vs {}", self.sport_title, self.home_team, self.away_team)
    }
}
