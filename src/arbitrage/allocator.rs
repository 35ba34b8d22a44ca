//! Stake allocation that locks in an equal payout on every outcome.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use super::calculator::ArbitrageOpportunity;
use crate::catalog::OutcomeKey;
use crate::error::ArbitrageError;
use crate::odds::BestPrice;

/// Stake on one outcome of an opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeAllocation {
    /// Outcome to back.
    pub outcome: OutcomeKey,
    /// Amount to stake.
    pub stake: Decimal,
    /// Quote the stake is placed at.
    pub best: BestPrice,
}

impl StakeAllocation {
    /// Total returned if this outcome wins.
    pub fn payout(&self) -> Decimal {
        self.stake * self.best.price
    }
}

/// Complete allocation of a budget across one opportunity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakePlan {
    /// Total amount staked.
    pub budget: Decimal,
    /// Amount returned whichever outcome wins.
    pub payout: Decimal,
    /// `payout - budget`.
    pub profit: Decimal,
    /// Per-outcome stakes.
    pub allocations: BTreeMap<OutcomeKey, StakeAllocation>,
}

/// Split `budget` across the opportunity's outcomes so that every outcome
/// pays out the same amount.
///
/// `payout = budget / total_inverse_price` and `stake_i = payout / price_i`,
/// so the stakes sum to the budget.
#[instrument(skip(opportunity), fields(event = %opportunity.event_id, market = %opportunity.market))]
pub fn allocate(
    opportunity: &ArbitrageOpportunity,
    budget: Decimal,
) -> Result<StakePlan, ArbitrageError> {
    if budget <= Decimal::ZERO {
        return Err(ArbitrageError::InvalidBudget(budget));
    }

    let degenerate = || ArbitrageError::DegenerateOpportunity {
        event_id: opportunity.event_id.clone(),
        market: opportunity.market.to_string(),
        total_inverse_price: opportunity.total_inverse_price,
    };

    if opportunity.total_inverse_price <= Decimal::ZERO {
        return Err(degenerate());
    }

    let payout = budget
        .checked_div(opportunity.total_inverse_price)
        .ok_or_else(degenerate)?;

    let allocations = opportunity
        .outcomes
        .iter()
        .map(|(outcome, best)| {
            let stake = payout.checked_div(best.price).ok_or_else(degenerate)?;
            Ok((
                outcome.clone(),
                StakeAllocation {
                    outcome: outcome.clone(),
                    stake,
                    best: best.clone(),
                },
            ))
        })
        .collect::<Result<BTreeMap<_, _>, ArbitrageError>>()?;

    let profit = payout - budget;
    debug!(budget = %budget, payout = %payout, profit = %profit, "Stakes allocated");

    Ok(StakePlan {
        budget,
        payout,
        profit,
        allocations,
    })
}
