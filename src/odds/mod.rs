//! Odds module for price conversion and cross-bookmaker aggregation.
//!
//! This module handles:
//! - Decimal to American odds conversion
//! - Best-price selection across allowed bookmakers

pub mod aggregator;
pub mod convert;
pub mod types;

pub use aggregator::{aggregate, aggregate_event, available_bookmakers};
pub use convert::{is_meaningful, to_american_odds, NO_AMERICAN_ODDS};
pub use types::{AggregatedEvent, BestPrice, BestPriceTable, OutcomePrices};
