//! Decimal to American odds conversion.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// American odds value returned for a quote with no payout information.
///
/// Decimal odds of exactly 1.0 return the stake and nothing else, so no
/// American figure exists. Display code must render this as "not
/// applicable" rather than as a number.
pub const NO_AMERICAN_ODDS: i64 = 0;

/// Convert decimal odds to American odds.
///
/// - `>= 2.0`: `floor((d - 1) * 100)`, underdog style, always `>= 100`
/// - `(1.0, 2.0)`: `floor(-100 / (d - 1))`, favourite style, always `<= -100`
/// - `1.0`: [`NO_AMERICAN_ODDS`]
///
/// Prices below 1.0 carry no meaningful American figure either and also
/// get the sentinel.
pub fn to_american_odds(decimal_odds: Decimal) -> i64 {
    if decimal_odds <= Decimal::ONE {
        return NO_AMERICAN_ODDS;
    }

    let profit = decimal_odds - Decimal::ONE;

    if decimal_odds >= Decimal::TWO {
        profit
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.floor().to_i64())
            .unwrap_or(i64::MAX)
    } else {
        Decimal::NEGATIVE_ONE
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|v| v.checked_div(profit))
            .and_then(|v| v.floor().to_i64())
            .unwrap_or(i64::MIN)
    }
}

/// Whether an American odds value carries real payout information.
pub fn is_meaningful(american_odds: i64) -> bool {
    american_odds != NO_AMERICAN_ODDS
}
