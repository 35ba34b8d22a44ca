//! Arbitrage opportunity detection over a best-price table.

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use super::calculator::{calculate_opportunity, effective_margin, ArbitrageOpportunity};
use crate::error::ArbitrageError;
use crate::odds::BestPriceTable;

/// Default detection threshold: any total inverse price below 1.
pub const DEFAULT_MAX_TOTAL_INVERSE: Decimal = Decimal::ONE;

/// Find every (event, market) whose best prices form an arbitrage.
///
/// Results are sorted ascending by total inverse price, most profitable
/// first. The sort is stable, so equal sums keep table order (event id,
/// then market key).
pub fn detect(table: &BestPriceTable) -> Vec<ArbitrageOpportunity> {
    scan_table(table, DEFAULT_MAX_TOTAL_INVERSE)
}

/// Like [`detect`], but only flags markets whose total inverse price is
/// strictly below `threshold`, which must lie in `(0, 1]`.
pub fn detect_with_threshold(
    table: &BestPriceTable,
    threshold: Decimal,
) -> Result<Vec<ArbitrageOpportunity>, ArbitrageError> {
    validate_threshold(threshold)?;
    Ok(scan_table(table, threshold))
}

/// Check a detection threshold lies in `(0, 1]`.
pub fn validate_threshold(threshold: Decimal) -> Result<(), ArbitrageError> {
    if threshold <= Decimal::ZERO || threshold > Decimal::ONE {
        return Err(ArbitrageError::InvalidThreshold(threshold));
    }
    Ok(())
}

#[instrument(skip(table), fields(events = table.len(), threshold = %threshold))]
fn scan_table(table: &BestPriceTable, threshold: Decimal) -> Vec<ArbitrageOpportunity> {
    let mut opportunities: Vec<ArbitrageOpportunity> = table
        .values()
        .flat_map(|event| {
            event.markets.iter().filter_map(move |(market, outcomes)| {
                let opportunity = calculate_opportunity(event, market, outcomes, threshold);
                if opportunity.is_none() {
                    debug!(
                        event_id = %event.id,
                        market = %market,
                        outcomes = outcomes.len(),
                        margin = ?effective_margin(outcomes),
                        "No arbitrage"
                    );
                }
                opportunity
            })
        })
        .collect();

    opportunities.sort_by(|a, b| a.total_inverse_price.cmp(&b.total_inverse_price));

    for opp in &opportunities {
        info!(
            event = %opp.label,
            market = %opp.market,
            total_inverse_price = %opp.total_inverse_price.round_dp(4),
            profit_pct = %opp.profit_pct().round_dp(2),
            "Arbitrage opportunity detected"
        );
    }

    opportunities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MarketKey, OutcomeKey};
    use crate::odds::{to_american_odds, AggregatedEvent, BestPrice, OutcomePrices};
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

    fn table(events: Vec<(&str, Vec<(&str, OutcomePrices)>)>) -> BestPriceTable {
        events
            .into_iter()
            .map(|(id, markets)| {
                (
                    id.to_string(),
                    AggregatedEvent {
                        id: id.to_string(),
                        label: format!("NFL: {id}"),
                        commence_time: datetime!(2024-09-08 17:00 UTC),
                        markets: markets
                            .into_iter()
                            .map(|(key, outcomes)| (MarketKey::new(key), outcomes))
                            .collect::<BTreeMap<_, _>>(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn flags_only_profitable_markets() {
        let table = table(vec![
            ("arb", vec![("h2h", prices(&[("A", dec!(2.10)), ("B", dec!(2.10))]))]),
            ("vig", vec![("h2h", prices(&[("A", dec!(1.80)), ("B", dec!(1.80))]))]),
        ]);

        let found = detect(&table);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].event_id, "arb");
    }

    #[test]
    fn ranks_most_profitable_first() {
        let table = table(vec![
            ("small", vec![("h2h", prices(&[("A", dec!(2.02)), ("B", dec!(2.02))]))]),
            ("large", vec![("h2h", prices(&[("A", dec!(2.50)), ("B", dec!(2.20))]))]),
            (
                "medium",
                vec![("totals", prices(&[("Over", dec!(2.10)), ("Under", dec!(2.10))]))],
            ),
        ]);

        let found = detect(&table);
        let order: Vec<_> = found.iter().map(|o| o.event_id.as_str()).collect();

        assert_eq!(order, vec!["large", "medium", "small"]);
        assert!(found
            .windows(2)
            .all(|w| w[0].total_inverse_price <= w[1].total_inverse_price));
    }

    #[test]
    fn single_outcome_markets_are_skipped() {
        let table = table(vec![("one", vec![("h2h", prices(&[("A", dec!(10))]))])]);
        assert!(detect(&table).is_empty());
    }

    #[test]
    fn empty_table_yields_no_opportunities() {
        assert!(detect(&BestPriceTable::new()).is_empty());
        assert!(detect(&table(vec![("bare", vec![])])).is_empty());
    }

    #[test]
    fn threshold_demands_a_margin() {
        // 1/2.05 + 1/2.05 = 0.9756
        let table = table(vec![(
            "thin",
            vec![("h2h", prices(&[("A", dec!(2.05)), ("B", dec!(2.05))]))],
        )]);

        assert_eq!(detect_with_threshold(&table, dec!(1)).unwrap().len(), 1);
        assert!(detect_with_threshold(&table, dec!(0.97)).unwrap().is_empty());
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let table = BestPriceTable::new();
        assert_eq!(
            detect_with_threshold(&table, dec!(1.01)),
            Err(ArbitrageError::InvalidThreshold(dec!(1.01)))
        );
        assert!(detect_with_threshold(&table, Decimal::ZERO).is_err());
    }
}
