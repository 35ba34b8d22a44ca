//! Inverse-price and profit calculations for arbitrage opportunities.

use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::catalog::MarketKey;
use crate::odds::{AggregatedEvent, OutcomePrices};

/// Fewest outcomes a market must cover to count as an arbitrage.
///
/// A single-sided "market" is just a bet, whatever its price.
pub const MIN_OUTCOMES: usize = 2;

/// Market whose best prices guarantee a profit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArbitrageOpportunity {
    /// Event identifier.
    pub event_id: String,
    /// Event display label.
    pub label: String,
    /// Scheduled start (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub commence_time: OffsetDateTime,
    /// Market key.
    pub market: MarketKey,
    /// Σ 1/price over every outcome; always < 1.
    pub total_inverse_price: Decimal,
    /// Best price per outcome.
    pub outcomes: OutcomePrices,
}

impl ArbitrageOpportunity {
    /// Guaranteed return on the total stake, in percent.
    pub fn profit_pct(&self) -> Decimal {
        match Decimal::ONE.checked_div(self.total_inverse_price) {
            Some(multiplier) => (multiplier - Decimal::ONE) * Decimal::ONE_HUNDRED,
            None => Decimal::ZERO,
        }
    }
}

/// Sum of inverse prices over a market's outcomes.
///
/// Returns `None` if any price is zero.
pub fn total_inverse_price(outcomes: &OutcomePrices) -> Option<Decimal> {
    outcomes.values().try_fold(Decimal::ZERO, |total, best| {
        Decimal::ONE
            .checked_div(best.price)
            .and_then(|inverse| total.checked_add(inverse))
    })
}

/// Build an opportunity if the market covers enough outcomes and its total
/// inverse price is strictly below `threshold`.
pub fn calculate_opportunity(
    event: &AggregatedEvent,
    market: &MarketKey,
    outcomes: &OutcomePrices,
    threshold: Decimal,
) -> Option<ArbitrageOpportunity> {
    if outcomes.len() < MIN_OUTCOMES {
        return None;
    }

    let total_inverse_price = total_inverse_price(outcomes)?;
    if total_inverse_price >= threshold {
        return None;
    }

    Some(ArbitrageOpportunity {
        event_id: event.id.clone(),
        label: event.label.clone(),
        commence_time: event.commence_time,
        market: market.clone(),
        total_inverse_price,
        outcomes: outcomes.clone(),
    })
}

/// Distance of a market from breaking even (`total_inverse_price - 1`);
/// negative values are profitable.
pub fn effective_margin(outcomes: &OutcomePrices) -> Option<Decimal> {
    total_inverse_price(outcomes).map(|total| total - Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::OutcomeKey;
    use crate::odds::{to_american_odds, BestPrice};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;
    use time::macros::datetime;

    fn prices(quotes: &[(&str, Decimal)]) -> OutcomePrices {
        quotes
            .iter()
            .map(|(name, price)| {
                (
                    OutcomeKey::named(*name),
                    BestPrice {
                        bookmaker: "book".to_string(),
                        price: *price,
                        american_odds: to_american_odds(*price),
                        last_update: datetime!(2024-03-01 12:00 UTC),
                    },
                )
            })
            .collect()
    }

    fn test_event() -> AggregatedEvent {
        AggregatedEvent {
            id: "e1".to_string(),
            label: "EPL: Arsenal vs Chelsea".to_string(),
            commence_time: datetime!(2024-03-02 15:00 UTC),
            markets: BTreeMap::new(),
        }
    }

    #[test]
    fn total_inverse_price_sums_reciprocals() {
        let total = total_inverse_price(&prices(&[("A", dec!(2)), ("B", dec!(4))])).unwrap();
        assert_eq!(total, dec!(0.75));
    }

    #[test]
    fn detect_arbitrage_when_profitable() {
        let outcomes = prices(&[("A", dec!(2.10)), ("B", dec!(2.10))]);

        let opp = calculate_opportunity(&test_event(), &MarketKey::from("h2h"), &outcomes, Decimal::ONE)
            .unwrap();

        assert!((opp.total_inverse_price - dec!(0.9524)).abs() < dec!(0.0001));
        assert_eq!(opp.label, "EPL: Arsenal vs Chelsea");
        // 2.10/2 - 1 = 5%
        assert!((opp.profit_pct() - dec!(5)).abs() < dec!(0.0000001));
    }

    #[test]
    fn no_arbitrage_when_overround() {
        let outcomes = prices(&[("A", dec!(1.80)), ("B", dec!(1.80))]);

        let opp = calculate_opportunity(&test_event(), &MarketKey::from("h2h"), &outcomes, Decimal::ONE);

        assert!(opp.is_none());
    }

    #[test]
    fn break_even_is_not_an_arbitrage() {
        let outcomes = prices(&[("A", dec!(2)), ("B", dec!(2))]);

        assert!(calculate_opportunity(&test_event(), &MarketKey::from("h2h"), &outcomes, Decimal::ONE).is_none());
    }

    #[test]
    fn single_outcome_is_never_an_arbitrage() {
        let outcomes = prices(&[("A", dec!(50))]);

        assert!(calculate_opportunity(&test_event(), &MarketKey::from("h2h"), &outcomes, Decimal::ONE).is_none());
    }

    #[test]
    fn three_way_market_counts_every_outcome() {
        let outcomes = prices(&[("Home", dec!(3)), ("Draw", dec!(4)), ("Away", dec!(4))]);

        let opp = calculate_opportunity(&test_event(), &MarketKey::from("h2h"), &outcomes, Decimal::ONE)
            .unwrap();

        // 1/3 + 1/4 + 1/4 = 0.8333...
        assert!((opp.total_inverse_price - dec!(0.8333)).abs() < dec!(0.0001));
    }

    #[test]
    fn effective_margin_is_negative_when_profitable() {
        let margin = effective_margin(&prices(&[("A", dec!(2)), ("B", dec!(4))])).unwrap();
        assert_eq!(margin, dec!(-0.25));
    }
}
