//! Event catalog module.
//!
//! This module handles:
//! - Validated event/bookmaker/market/outcome types
//! - Lenient decoding of the raw odds feed with per-record diagnostics

pub mod parse;
pub mod types;

pub use parse::{parse_catalog, parse_events, ParsedCatalog, RecordDiagnostic};
pub use types::{BookmakerQuote, Event, Market, MarketKey, Outcome, OutcomeKey};
