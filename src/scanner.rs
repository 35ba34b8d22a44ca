//! Aggregate → detect → allocate pipeline over one catalog snapshot.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::arbitrage::{
    allocate, detect_with_threshold, validate_threshold, ArbitrageOpportunity, StakePlan,
    DEFAULT_MAX_TOTAL_INVERSE,
};
use crate::catalog::{parse_catalog, Event, RecordDiagnostic};
use crate::config::Config;
use crate::error::ArbitrageError;
use crate::metrics;
use crate::odds::aggregate;
use crate::selection::AllowList;

/// Explicit settings for one scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    /// Bookmakers whose quotes are used.
    pub allow_list: AllowList,
    /// Markets qualify only below this total inverse price.
    pub max_total_inverse: Decimal,
    /// Budget allocated to each opportunity.
    pub stake: Decimal,
}

impl ScanSettings {
    /// Settings with the default threshold and a $100 budget.
    pub fn new(allow_list: AllowList) -> Self {
        Self {
            allow_list,
            max_total_inverse: DEFAULT_MAX_TOTAL_INVERSE,
            stake: Decimal::ONE_HUNDRED,
        }
    }

    /// Settings from configuration with an already-chosen allow-list.
    pub fn from_config(config: &Config, allow_list: AllowList) -> Self {
        Self {
            allow_list,
            max_total_inverse: config.max_total_inverse,
            stake: config.total_stake,
        }
    }
}

/// An opportunity together with its stake plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOpportunity {
    /// Detected opportunity.
    pub opportunity: ArbitrageOpportunity,
    /// Stakes for the configured budget.
    pub plan: StakePlan,
}

/// Opportunity that was detected but could not be staked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedOpportunity {
    /// Event identifier.
    pub event_id: String,
    /// Market key.
    pub market: String,
    /// Why allocation failed.
    pub reason: String,
}

/// Result of one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    /// Events in the scanned catalog.
    pub events_scanned: usize,
    /// Opportunities, most profitable first.
    pub opportunities: Vec<RankedOpportunity>,
    /// Opportunities dropped because no stake plan could be built.
    pub skipped: Vec<SkippedOpportunity>,
}

impl ScanReport {
    /// Whether nothing qualified.
    pub fn is_empty(&self) -> bool {
        self.opportunities.is_empty()
    }
}

/// Runs the pipeline with fixed settings.
///
/// Holds no mutable state: every [`Scanner::scan`] call builds fresh
/// output, so one scanner can serve several threads.
#[derive(Debug, Clone)]
pub struct Scanner {
    settings: ScanSettings,
}

impl Scanner {
    /// Create a scanner, rejecting a non-positive stake or a threshold
    /// outside `(0, 1]`.
    pub fn new(settings: ScanSettings) -> Result<Self, ArbitrageError> {
        if settings.stake <= Decimal::ZERO {
            return Err(ArbitrageError::InvalidBudget(settings.stake));
        }
        validate_threshold(settings.max_total_inverse)?;
        Ok(Self { settings })
    }

    /// Scanner settings.
    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Scan one catalog snapshot.
    #[instrument(skip_all, fields(events = events.len(), allowed = self.settings.allow_list.len()))]
    pub fn scan(&self, events: &[Event]) -> Result<ScanReport, ArbitrageError> {
        let _timer = metrics::timer_scan();

        let table = aggregate(events, &self.settings.allow_list);
        let detected = detect_with_threshold(&table, self.settings.max_total_inverse)?;

        let mut opportunities = Vec::with_capacity(detected.len());
        let mut skipped = Vec::new();
        for opportunity in detected {
            match allocate(&opportunity, self.settings.stake) {
                Ok(plan) => opportunities.push(RankedOpportunity { opportunity, plan }),
                Err(e) => {
                    warn!(
                        event_id = %opportunity.event_id,
                        market = %opportunity.market,
                        error = %e,
                        "Skipping opportunity that cannot be staked"
                    );
                    skipped.push(SkippedOpportunity {
                        event_id: opportunity.event_id,
                        market: opportunity.market.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        metrics::add_events_scanned(events.len());
        metrics::add_opportunities_detected(opportunities.len());
        info!(
            events = events.len(),
            opportunities = opportunities.len(),
            skipped = skipped.len(),
            "Scan complete"
        );

        Ok(ScanReport {
            events_scanned: events.len(),
            opportunities,
            skipped,
        })
    }

    /// Decode a raw catalog document and scan it.
    ///
    /// Malformed records are skipped and returned alongside the report.
    pub fn scan_json(&self, json: &str) -> crate::Result<(ScanReport, Vec<RecordDiagnostic>)> {
        let catalog = parse_catalog(json)?;
        let report = self.scan(&catalog.events)?;
        Ok((report, catalog.diagnostics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BookmakerQuote, Market, MarketKey, Outcome, OutcomeKey};
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    fn h2h(bookmaker: &str, team1: Decimal, team2: Decimal) -> BookmakerQuote {
        BookmakerQuote {
            key: bookmaker.to_string(),
            last_update: datetime!(2024-03-01 12:00 UTC),
            markets: vec![Market {
                key: MarketKey::new("h2h"),
                outcomes: vec![
                    Outcome::new(OutcomeKey::named("Team1"), team1),
                    Outcome::new(OutcomeKey::named("Team2"), team2),
                ],
            }],
        }
    }

    fn event(id: &str, bookmakers: Vec<BookmakerQuote>) -> Event {
        Event {
            id: id.to_string(),
            sport_title: "NBA".to_string(),
            home_team: "Team1".to_string(),
            away_team: "Team2".to_string(),
            commence_time: datetime!(2024-03-01 19:00 UTC),
            bookmakers,
        }
    }

    fn catalog() -> Vec<Event> {
        vec![event(
            "e1",
            vec![h2h("x", dec!(2.10), dec!(1.80)), h2h("y", dec!(1.95), dec!(2.20))],
        )]
    }

    fn allow(keys: &[&str]) -> AllowList {
        keys.iter().copied().collect()
    }

    #[test]
    fn scan_finds_cross_book_arbitrage() {
        let scanner = Scanner::new(ScanSettings::new(allow(&["x", "y"]))).unwrap();

        let report = scanner.scan(&catalog()).unwrap();

        assert_eq!(report.events_scanned, 1);
        assert_eq!(report.opportunities.len(), 1);
        let ranked = &report.opportunities[0];
        assert!((ranked.opportunity.total_inverse_price - dec!(0.9307)).abs() < dec!(0.0001));
        assert!((ranked.plan.payout - dec!(107.44)).abs() < dec!(0.01));
    }

    #[test]
    fn single_book_has_no_arbitrage() {
        let scanner = Scanner::new(ScanSettings::new(allow(&["x"]))).unwrap();
        assert!(scanner.scan(&catalog()).unwrap().is_empty());
    }

    #[test]
    fn empty_inputs_give_empty_reports() {
        let scanner = Scanner::new(ScanSettings::new(AllowList::new())).unwrap();
        assert!(scanner.scan(&catalog()).unwrap().is_empty());

        let scanner = Scanner::new(ScanSettings::new(allow(&["x"]))).unwrap();
        let report = scanner.scan(&[]).unwrap();
        assert_eq!(report.events_scanned, 0);
        assert!(report.is_empty());
    }

    #[test]
    fn from_config_carries_stake_and_threshold() {
        let config = Config {
            total_stake: dec!(250),
            max_total_inverse: dec!(0.98),
            ..Config::default()
        };

        let scanner = Scanner::new(ScanSettings::from_config(&config, allow(&["x"]))).unwrap();

        assert_eq!(scanner.settings().stake, dec!(250));
        assert_eq!(scanner.settings().max_total_inverse, dec!(0.98));
        assert!(scanner.settings().allow_list.contains("x"));
    }

    #[test]
    fn new_rejects_bad_settings() {
        let mut settings = ScanSettings::new(allow(&["x"]));
        settings.stake = dec!(0);
        assert_eq!(
            Scanner::new(settings).unwrap_err(),
            ArbitrageError::InvalidBudget(dec!(0))
        );

        let mut settings = ScanSettings::new(allow(&["x"]));
        settings.max_total_inverse = dec!(2);
        assert!(Scanner::new(settings).is_err());
    }

    #[test]
    fn unstakeable_opportunity_does_not_sink_the_scan() {
        let huge = Decimal::from_scientific("5e27").unwrap();
        let mut events = catalog();
        events.push(event("junk", vec![h2h("x", huge, huge), h2h("y", huge, huge)]));
        let scanner = Scanner::new(ScanSettings::new(allow(&["x", "y"]))).unwrap();

        let report = scanner.scan(&events).unwrap();

        assert_eq!(report.events_scanned, 2);
        assert_eq!(report.opportunities.len(), 1);
        assert_eq!(report.opportunities[0].opportunity.event_id, "e1");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].event_id, "junk");
        assert_eq!(report.skipped[0].market, "h2h");
    }

    #[test]
    fn scanner_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Scanner>();
    }
}
