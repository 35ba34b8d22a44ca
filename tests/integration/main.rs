//! End-to-end tests over a saved odds snapshot.
//!
//! Run with: cargo test --test integration

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::macros::{datetime, offset};

use book_scout::catalog::{OutcomeKey, RecordDiagnostic};
use book_scout::error::CatalogError;
use book_scout::feed::load_snapshot;
use book_scout::odds::available_bookmakers;
use book_scout::report::{render_json, render_text, NO_OPPORTUNITIES};
use book_scout::selection::{load_allow_list, AllowList};
use book_scout::{ScanReport, ScanSettings, Scanner};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn snapshot() -> String {
    tokio_test::block_on(load_snapshot(fixture("odds_snapshot.json"))).unwrap()
}

fn allow(keys: &[&str]) -> AllowList {
    keys.iter().copied().collect()
}

fn scan(allow_list: AllowList) -> (ScanReport, Vec<RecordDiagnostic>) {
    Scanner::new(ScanSettings::new(allow_list))
        .unwrap()
        .scan_json(&snapshot())
        .unwrap()
}

fn close(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < dec!(0.01)
}

#[test]
fn scans_snapshot_and_ranks_opportunities() {
    let (report, _) = scan(allow(&["x", "y"]));

    assert_eq!(report.events_scanned, 3);

    let found: Vec<(&str, &str)> = report
        .opportunities
        .iter()
        .map(|r| (r.opportunity.event_id.as_str(), r.opportunity.market.as_str()))
        .collect();
    assert_eq!(found, vec![("evt-1", "h2h"), ("evt-2", "totals")]);

    let totals: Vec<Decimal> = report
        .opportunities
        .iter()
        .map(|r| r.opportunity.total_inverse_price)
        .collect();
    assert!(totals.windows(2).all(|w| w[0] <= w[1]));
    assert!(totals.iter().all(|t| *t < Decimal::ONE));
}

#[test]
fn cross_book_stakes_equalize_payout() {
    let (report, _) = scan(allow(&["x", "y"]));
    let best = &report.opportunities[0];

    let team1 = &best.plan.allocations[&OutcomeKey::named("Team1")];
    let team2 = &best.plan.allocations[&OutcomeKey::named("Team2")];

    assert_eq!(team1.best.bookmaker, "x");
    assert_eq!(team2.best.bookmaker, "y");
    assert_eq!(team1.best.american_odds, 110);
    assert_eq!(team2.best.american_odds, 120);
    assert!(close(team1.stake, dec!(51.16)));
    assert!(close(team2.stake, dec!(48.84)));
    assert!(close(best.plan.payout, dec!(107.44)));
    assert!((team1.payout() - team2.payout()).abs() < dec!(0.000000001));
}

#[test]
fn totals_outcomes_are_keyed_by_line() {
    let (report, _) = scan(allow(&["x", "y"]));
    let totals = &report.opportunities[1];

    let over = &totals.opportunity.outcomes[&OutcomeKey::with_point("Over", dec!(5.5))];
    let under = &totals.opportunity.outcomes[&OutcomeKey::with_point("Under", dec!(5.5))];

    assert_eq!((over.bookmaker.as_str(), over.price), ("x", dec!(2.05)));
    assert_eq!((under.bookmaker.as_str(), under.price), ("y", dec!(2.02)));
}

#[test]
fn excluded_bookmaker_never_contributes() {
    let (report, _) = scan(allow(&["x", "y"]));

    for ranked in &report.opportunities {
        assert!(ranked
            .opportunity
            .outcomes
            .values()
            .all(|best| best.bookmaker != "z"));
    }

    let (with_z, _) = scan(allow(&["x", "y", "z"]));
    let top = &with_z.opportunities[0];
    assert_eq!(top.opportunity.event_id, "evt-1");
    assert!(top.opportunity.outcomes.values().all(|best| best.bookmaker == "z"));
}

#[test]
fn single_bookmaker_finds_nothing() {
    let (report, _) = scan(allow(&["x"]));
    assert!(report.is_empty());

    let (report, _) = scan(AllowList::new());
    assert!(report.is_empty());
}

#[test]
fn malformed_records_are_reported_not_fatal() {
    let (_, diagnostics) = scan(allow(&["x", "y"]));

    let errors: Vec<(Option<&str>, &CatalogError)> = diagnostics
        .iter()
        .map(|d| (d.event_id.as_deref(), &d.error))
        .collect();
    assert_eq!(
        errors,
        vec![
            (
                Some("evt-3"),
                &CatalogError::NonNumericPrice("\"abc\"".to_string())
            ),
            (Some("evt-4"), &CatalogError::MissingField("commence_time")),
        ]
    );
    assert_eq!(diagnostics[0].bookmaker.as_deref(), Some("x"));
}

#[test]
fn allow_list_file_selects_bookmakers() {
    let allow_list = load_allow_list(fixture("bookmakers.csv"));
    assert_eq!(allow_list, allow(&["x", "y"]));

    let (report, _) = scan(allow_list);
    assert_eq!(report.opportunities.len(), 2);
}

#[test]
fn bookmakers_listed_from_snapshot() {
    let catalog = book_scout::catalog::parse_catalog(&snapshot()).unwrap();
    assert_eq!(available_bookmakers(&catalog.events), vec!["x", "y", "z"]);
}

#[test]
fn reports_render_in_both_formats() {
    let (report, _) = scan(allow(&["x", "y"]));

    let text = render_text(&report, offset!(-7), datetime!(2024-03-01 12:00 UTC));
    assert!(text.starts_with("Arbitrage Opportunities (2 found in 3 events):"));
    assert!(text.contains("NBA: Team1 vs Team2 starting T- 7h 00m (2024-03-01 12:00 -07:00)"));
    assert!(text.contains("Bet on Team1: $51.16"));
    assert!(text.contains("American Odds: +120"));
    assert!(text.contains("Bet on Over 5.5"));

    let json: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();
    assert_eq!(json["events_scanned"], 3);
    assert_eq!(json["opportunities"][0]["opportunity"]["event_id"], "evt-1");
    assert!(json["opportunities"][1]["plan"]["allocations"]
        .get("Over 5.5")
        .is_some());

    let (empty, _) = scan(allow(&["x"]));
    let text = render_text(&empty, offset!(-7), datetime!(2024-03-01 12:00 UTC));
    assert!(text.starts_with(NO_OPPORTUNITIES));
}
