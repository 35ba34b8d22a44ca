//! Text and JSON presentation of scan results.

use std::fmt::Write;

use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

use crate::odds::is_meaningful;
use crate::scanner::ScanReport;

/// Rendered when a scan finds nothing.
pub const NO_OPPORTUNITIES: &str = "No arbitrage opportunities found.";

/// American odds for display, with an explicit sign; the no-payout
/// sentinel renders as "N/A".
pub fn format_american(american_odds: i64) -> String {
    if !is_meaningful(american_odds) {
        "N/A".to_string()
    } else if american_odds > 0 {
        format!("+{american_odds}")
    } else {
        american_odds.to_string()
    }
}

/// "T- 1d 2h 05m" before `instant`, "T+ ..." once it has passed.
pub fn time_label(instant: OffsetDateTime, now: OffsetDateTime) -> String {
    let diff = instant - now;
    if diff.is_positive() {
        format!("T- {}", format_duration(diff))
    } else {
        format!("T+ {}", format_duration(diff.abs()))
    }
}

fn format_duration(duration: Duration) -> String {
    let days = duration.whole_days();
    let hours = duration.whole_hours() % 24;
    let minutes = duration.whole_minutes() % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes:02}m")
    } else {
        format!("{hours}h {minutes:02}m")
    }
}

/// Instant shown in the display offset, e.g. "2024-03-01 12:00 -07:00".
pub fn format_local(instant: OffsetDateTime, offset: UtcOffset) -> String {
    let format = format_description!(
        "[year]-[month]-[day] [hour]:[minute] [offset_hour sign:mandatory]:[offset_minute]"
    );
    instant
        .to_offset(offset)
        .format(format)
        .unwrap_or_else(|_| instant.to_string())
}

/// Human-readable report, one block per opportunity in ranked order.
pub fn render_text(report: &ScanReport, offset: UtcOffset, now: OffsetDateTime) -> String {
    let mut out = String::new();
    if report.is_empty() {
        let _ = writeln!(out, "{NO_OPPORTUNITIES} ({} events scanned)", report.events_scanned);
        write_skipped(&mut out, report);
        return out;
    }

    let _ = writeln!(
        out,
        "Arbitrage Opportunities ({} found in {} events):",
        report.opportunities.len(),
        report.events_scanned
    );

    for ranked in &report.opportunities {
        let opp = &ranked.opportunity;
        let plan = &ranked.plan;

        let _ = writeln!(
            out,
            "\n{} starting {} ({}), Market: {}, Total Inverse Price: {}, Profit: {}%",
            opp.label,
            time_label(opp.commence_time, now),
            format_local(opp.commence_time, offset),
            opp.market,
            opp.total_inverse_price.round_dp(4),
            opp.profit_pct().round_dp(2),
        );

        for allocation in plan.allocations.values() {
            let best = &allocation.best;
            let _ = writeln!(
                out,
                "  {} (last update {}):\n    Bet on {}: ${}, Decimal Odds: {}, American Odds: {}",
                best.bookmaker,
                time_label(best.last_update, now),
                allocation.outcome,
                allocation.stake.round_dp(2),
                best.price,
                format_american(best.american_odds),
            );
        }

        let _ = writeln!(
            out,
            "  Stake ${} -> payout ${} (profit ${})",
            plan.budget.round_dp(2),
            plan.payout.round_dp(2),
            plan.profit.round_dp(2),
        );
    }

    write_skipped(&mut out, report);
    out
}

fn write_skipped(out: &mut String, report: &ScanReport) {
    for skipped in &report.skipped {
        let _ = writeln!(
            out,
            "Skipped {}/{}: {}",
            skipped.event_id, skipped.market, skipped.reason
        );
    }
}

/// Report as pretty-printed JSON.
pub fn render_json(report: &ScanReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
