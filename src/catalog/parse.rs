//! Lenient decoding of the odds feed into validated catalog types.
//!
//! Each event, bookmaker, market and outcome is decoded on its own. A
//! malformed record is skipped and reported as a [`RecordDiagnostic`]; its
//! siblings are still processed. A market with any malformed outcome is
//! dropped whole, because a partial market would understate the number of
//! outcomes that must be covered.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Number, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

use super::types::{BookmakerQuote, Event, Market, MarketKey, Outcome, OutcomeKey};
use crate::error::CatalogError;
use crate::metrics;

#[derive(Debug, Deserialize)]
struct RawEvent {
    id: Option<String>,
    sport_title: Option<String>,
    home_team: Option<String>,
    away_team: Option<String>,
    commence_time: Option<String>,
    bookmakers: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawBookmaker {
    key: Option<String>,
    last_update: Option<String>,
    markets: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    key: Option<String>,
    outcomes: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RawOutcome {
    name: Option<String>,
    price: Option<Value>,
    point: Option<Value>,
}

/// Where in the catalog a rejected record sits, and why it was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDiagnostic {
    /// Event id, when known.
    pub event_id: Option<String>,
    /// Bookmaker key, when the record is below an event.
    pub bookmaker: Option<String>,
    /// Market key, when the record is below a bookmaker.
    pub market: Option<String>,
    /// Outcome name, when the record is an outcome.
    pub outcome: Option<String>,
    /// Reason for rejection.
    pub error: CatalogError,
}

impl fmt::Display for RecordDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut path = vec![format!("event={}", self.event_id.as_deref().unwrap_or("?"))];
        if let Some(bookmaker) = &self.bookmaker {
            path.push(format!("bookmaker={bookmaker}"));
        }
        if let Some(market) = &self.market {
            path.push(format!("market={market}"));
        }
        if let Some(outcome) = &self.outcome {
            path.push(format!("outcome={outcome}"));
        }
        write!(f, "{}: {}", path.join(" "), self.error)
    }
}

/// Decoded catalog plus everything that had to be skipped.
#[derive(Debug, Clone, Default)]
pub struct ParsedCatalog {
    /// Events that passed validation, in feed order.
    pub events: Vec<Event>,
    /// Rejected records.
    pub diagnostics: Vec<RecordDiagnostic>,
}

/// Location context threaded through the nested decoders.
#[derive(Debug, Clone, Default)]
struct Path {
    event_id: Option<String>,
    bookmaker: Option<String>,
    market: Option<String>,
    outcome: Option<String>,
}

impl Path {
    fn reject(&self, error: CatalogError) -> RecordDiagnostic {
        let diagnostic = RecordDiagnostic {
            event_id: self.event_id.clone(),
            bookmaker: self.bookmaker.clone(),
            market: self.market.clone(),
            outcome: self.outcome.clone(),
            error,
        };
        warn!(record = %diagnostic, "Skipping malformed catalog record");
        metrics::inc_records_rejected();
        diagnostic
    }
}

/// Decode a catalog document (a JSON array of events).
///
/// Only a document that is not valid JSON, or not an array, fails as a
/// whole. Everything else degrades record by record.
#[instrument(skip(json), fields(bytes = json.len()))]
pub fn parse_catalog(json: &str) -> Result<ParsedCatalog, CatalogError> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| CatalogError::Malformed(e.to_string()))?;

    match document {
        Value::Array(items) => Ok(parse_events(items)),
        _ => Err(CatalogError::NotAnArray),
    }
}

/// Decode already-split event values.
pub fn parse_events(items: Vec<Value>) -> ParsedCatalog {
    let mut diagnostics = Vec::new();
    let events: Vec<Event> = items
        .into_iter()
        .filter_map(|item| parse_event(item, &mut diagnostics))
        .collect();

    debug!(
        events = events.len(),
        rejected = diagnostics.len(),
        "Catalog decoded"
    );

    ParsedCatalog {
        events,
        diagnostics,
    }
}

fn parse_event(item: Value, diagnostics: &mut Vec<RecordDiagnostic>) -> Option<Event> {
    // Best-effort id for diagnostics, even if the record fails to decode.
    let mut path = Path {
        event_id: item.get("id").and_then(Value::as_str).map(str::to_string),
        ..Path::default()
    };

    let result = decode::<RawEvent>(item).and_then(|raw| {
        let id = required(raw.id, "id")?;
        path.event_id = Some(id.clone());
        Ok((
            id,
            required(raw.sport_title, "sport_title")?,
            required(raw.home_team, "home_team")?,
            required(raw.away_team, "away_team")?,
            parse_instant(required(raw.commence_time, "commence_time")?, "commence_time")?,
            required(raw.bookmakers, "bookmakers")?,
        ))
    });

    let (id, sport_title, home_team, away_team, commence_time, bookmakers) = match result {
        Ok(fields) => fields,
        Err(e) => {
            diagnostics.push(path.reject(e));
            return None;
        }
    };

    let bookmakers = bookmakers
        .into_iter()
        .filter_map(|value| parse_bookmaker(value, &path, diagnostics))
        .collect();

    Some(Event {
        id,
        sport_title,
        home_team,
        away_team,
        commence_time,
        bookmakers,
    })
}

fn parse_bookmaker(
    value: Value,
    parent: &Path,
    diagnostics: &mut Vec<RecordDiagnostic>,
) -> Option<BookmakerQuote> {
    let mut path = parent.clone();
    path.bookmaker = value.get("key").and_then(Value::as_str).map(str::to_string);

    let result = decode::<RawBookmaker>(value).and_then(|raw| {
        Ok((
            required(raw.key, "key")?,
            parse_instant(required(raw.last_update, "last_update")?, "last_update")?,
            required(raw.markets, "markets")?,
        ))
    });

    let (key, last_update, markets) = match result {
        Ok(fields) => fields,
        Err(e) => {
            diagnostics.push(path.reject(e));
            return None;
        }
    };

    let markets = markets
        .into_iter()
        .filter_map(|value| parse_market(value, &path, diagnostics))
        .collect();

    Some(BookmakerQuote {
        key,
        last_update,
        markets,
    })
}

fn parse_market(
    value: Value,
    parent: &Path,
    diagnostics: &mut Vec<RecordDiagnostic>,
) -> Option<Market> {
    let mut path = parent.clone();
    path.market = value.get("key").and_then(Value::as_str).map(str::to_string);

    let result = decode::<RawMarket>(value)
        .and_then(|raw| Ok((required(raw.key, "key")?, required(raw.outcomes, "outcomes")?)));

    let (key, raw_outcomes) = match result {
        Ok(fields) => fields,
        Err(e) => {
            diagnostics.push(path.reject(e));
            return None;
        }
    };

    let mut outcomes = Vec::with_capacity(raw_outcomes.len());
    for value in raw_outcomes {
        let mut outcome_path = path.clone();
        outcome_path.outcome = value.get("name").and_then(Value::as_str).map(str::to_string);

        match parse_outcome(value) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) => {
                diagnostics.push(outcome_path.reject(e));
                return None;
            }
        }
    }

    Some(Market {
        key: MarketKey::new(key),
        outcomes,
    })
}

fn parse_outcome(value: Value) -> Result<Outcome, CatalogError> {
    let raw = decode::<RawOutcome>(value)?;
    let name = required(raw.name, "name")?;
    let price = parse_price(required(raw.price, "price")?)?;

    let key = match raw.point {
        None | Some(Value::Null) => OutcomeKey::named(name),
        Some(point) => OutcomeKey::with_point(name, parse_point(point)?),
    };

    Ok(Outcome::new(key, price))
}

fn parse_price(value: Value) -> Result<Decimal, CatalogError> {
    let price = match &value {
        Value::Number(n) => {
            number_to_decimal(n).ok_or_else(|| CatalogError::PriceOutOfRange(n.to_string()))?
        }
        _ => return Err(CatalogError::NonNumericPrice(value.to_string())),
    };

    if price <= Decimal::ZERO {
        return Err(CatalogError::InvalidPrice(price));
    }

    Ok(price)
}

fn parse_point(value: Value) -> Result<Decimal, CatalogError> {
    let point = match &value {
        Value::Number(n) => number_to_decimal(n),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };

    point.ok_or_else(|| CatalogError::InvalidPoint(value.to_string()))
}

fn number_to_decimal(n: &Number) -> Option<Decimal> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn parse_instant(value: String, field: &'static str) -> Result<OffsetDateTime, CatalogError> {
    OffsetDateTime::parse(&value, &Rfc3339)
        .map_err(|_| CatalogError::InvalidTimestamp { field, value })
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, CatalogError> {
    serde_json::from_value(value).map_err(|e| CatalogError::Malformed(e.to_string()))
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, CatalogError> {
    value.ok_or(CatalogError::MissingField(field))
}
