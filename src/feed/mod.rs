//! Odds feed module.
//!
//! This module handles:
//! - Fetching the live odds document over HTTP
//! - Loading saved snapshots from disk

pub mod client;
pub mod snapshot;

pub use client::OddsApiClient;
pub use snapshot::load_snapshot;
