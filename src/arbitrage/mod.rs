//! Arbitrage module for detecting opportunities and sizing stakes.
//!
//! This module handles:
//! - Inverse-price and profit calculations
//! - Opportunity detection and ranking over a best-price table
//! - Stake allocation for an equal guaranteed payout

pub mod allocator;
pub mod calculator;
pub mod detector;

pub use allocator::{allocate, StakeAllocation, StakePlan};
pub use calculator::{calculate_opportunity, total_inverse_price, ArbitrageOpportunity, MIN_OUTCOMES};
pub use detector::{detect, detect_with_threshold, validate_threshold, DEFAULT_MAX_TOTAL_INVERSE};
