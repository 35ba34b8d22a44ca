//! Cross-bookmaker sports odds scanner.
//!
//! Takes odds quoted by several bookmakers for the same events, keeps the
//! best price per outcome, and flags every market whose best prices cover
//! all outcomes for less than the guaranteed payout.
//!
//! # Strategy
//!
//! Back every outcome at its best price. If the implied probabilities sum
//! to less than one, the payout is the same whichever outcome wins and
//! exceeds the total staked:
//!
//! ```text
//! Team1 @ 2.10 (bookmaker X)  -> 1/2.10 = 0.4762
//! Team2 @ 2.20 (bookmaker Y)  -> 1/2.20 = 0.4545
//! ──────────────────────────────────────────────
//! Total inverse price:           0.9307 < 1 ✅
//! $100 staked returns $107.44 either way
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: Event/quote data model and lenient feed decoding
//! - [`odds`]: Decimal→American conversion and best-price aggregation
//! - [`arbitrage`]: Opportunity detection and stake allocation
//! - [`selection`]: Bookmaker allow-lists
//! - [`scanner`]: The aggregate → detect → allocate pipeline
//! - [`feed`]: Odds API client and snapshot loading
//! - [`report`]: Text/JSON presentation
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`metrics`]: Counters and latency histograms

pub mod arbitrage;
pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod odds;
pub mod report;
pub mod scanner;
pub mod selection;

pub use config::Config;
pub use error::{Result, ScoutError};
pub use scanner::{ScanReport, ScanSettings, Scanner};
