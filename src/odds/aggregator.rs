//! Cross-bookmaker reduction to the best price per outcome.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use super::convert::to_american_odds;
use super::types::{AggregatedEvent, BestPrice, BestPriceTable, OutcomePrices};
use crate::catalog::{BookmakerQuote, Event, MarketKey, Outcome};
use crate::selection::AllowList;

/// Reduce a catalog to the best price per (event, market, outcome) among
/// allowed bookmakers.
///
/// A quote replaces the running best only if it is strictly higher, so on a
/// tie the bookmaker seen first in catalog order keeps the entry. Events
/// with no allowed quotes are kept with an empty market map.
#[instrument(skip_all, fields(events = events.len(), allowed = allow_list.len()))]
pub fn aggregate(events: &[Event], allow_list: &AllowList) -> BestPriceTable {
    let table = events.iter().fold(BestPriceTable::new(), |mut table, event| {
        if table
            .insert(event.id.clone(), aggregate_event(event, allow_list))
            .is_some()
        {
            warn!(event_id = %event.id, "Duplicate event id, keeping the later record");
        }
        table
    });

    debug!(events = table.len(), "Aggregation complete");
    table
}

/// Aggregate a single event.
pub fn aggregate_event(event: &Event, allow_list: &AllowList) -> AggregatedEvent {
    let markets = event
        .bookmakers
        .iter()
        .filter(|quote| allow_list.contains(&quote.key))
        .flat_map(|quote| quote.markets.iter().map(move |market| (quote, market)))
        .fold(
            BTreeMap::<MarketKey, OutcomePrices>::new(),
            |mut markets, (quote, market)| {
                let best = markets.entry(market.key.clone()).or_default();
                for outcome in &market.outcomes {
                    offer(best, quote, outcome, &event.id);
                }
                markets
            },
        );

    AggregatedEvent {
        id: event.id.clone(),
        label: event.label(),
        commence_time: event.commence_time,
        markets,
    }
}

fn offer(best: &mut OutcomePrices, quote: &BookmakerQuote, outcome: &Outcome, event_id: &str) {
    if outcome.price <= Decimal::ZERO {
        warn!(
            event_id,
            bookmaker = %quote.key,
            outcome = %outcome.key,
            price = %outcome.price,
            "Ignoring non-positive price"
        );
        return;
    }

    match best.entry(outcome.key.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(best_price(quote, outcome));
        }
        Entry::Occupied(mut slot) => {
            if outcome.price > slot.get().price {
                slot.insert(best_price(quote, outcome));
            }
        }
    }
}

fn best_price(quote: &BookmakerQuote, outcome: &Outcome) -> BestPrice {
    BestPrice {
        bookmaker: quote.key.clone(),
        price: outcome.price,
        american_odds: to_american_odds(outcome.price),
        last_update: quote.last_update,
    }
}

/// Every bookmaker key quoted anywhere in the catalog, sorted.
pub fn available_bookmakers(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .flat_map(|event| event.bookmakers.iter().map(|quote| quote.key.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
