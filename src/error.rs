//! Unified error types for the odds scanner.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the odds scanner.
#[derive(Error, Debug)]
pub enum ScoutError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Catalog decoding error.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Arbitrage detection/allocation error.
    #[error("arbitrage error: {0}")]
    Arbitrage(#[from] ArbitrageError),

    /// Odds feed retrieval error.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems with a single catalog record.
///
/// These never abort a scan: the offending record is skipped and reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// The catalog document is not a JSON array of events.
    #[error("catalog is not a JSON array of events")]
    NotAnArray,

    /// A required field is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong shape.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// Price is not a number.
    #[error("non-numeric price: {0}")]
    NonNumericPrice(String),

    /// Price is a number but too large or too precise for a decimal.
    #[error("price {0} is out of range")]
    PriceOutOfRange(String),

    /// Price is zero or negative.
    #[error("invalid decimal price {0}: must be greater than zero")]
    InvalidPrice(Decimal),

    /// Point value on a line is not a representable number.
    #[error("invalid point value: {0}")]
    InvalidPoint(String),

    /// Timestamp is not an RFC 3339 instant.
    #[error("invalid timestamp `{value}` in `{field}`")]
    InvalidTimestamp {
        /// Field carrying the timestamp.
        field: &'static str,
        /// Raw value received.
        value: String,
    },
}

/// Arbitrage detection and allocation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArbitrageError {
    /// Stake budget must be strictly positive.
    #[error("invalid stake budget: {0} (must be greater than zero)")]
    InvalidBudget(Decimal),

    /// Detection threshold outside (0, 1].
    #[error("invalid total inverse price threshold: {0} (must be in (0, 1])")]
    InvalidThreshold(Decimal),

    /// Opportunity has no usable inverse price sum.
    #[error("degenerate opportunity for {event_id}/{market}: total inverse price {total_inverse_price}")]
    DegenerateOpportunity {
        /// Event the opportunity belongs to.
        event_id: String,
        /// Market key.
        market: String,
        /// Offending sum.
        total_inverse_price: Decimal,
    },
}

/// Bookmaker selection errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    /// Nothing was entered.
    #[error("no bookmakers selected")]
    Empty,

    /// An index is not a number.
    #[error("`{0}` is not a number")]
    NotANumber(String),

    /// An index does not name an available bookmaker.
    #[error("index {index} out of range (1..={available})")]
    OutOfRange {
        /// Index as entered (1-based).
        index: usize,
        /// Number of bookmakers offered.
        available: usize,
    },
}

/// Odds feed retrieval errors.
#[derive(Error, Debug)]
pub enum FeedError {
    /// No API key configured.
    #[error("ODDS_API_KEY is not set")]
    MissingApiKey,

    /// Endpoint URL could not be built.
    #[error("invalid feed url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status.
    #[error("feed returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Snapshot file could not be read.
    #[error("failed to read snapshot {path}: {source}")]
    Snapshot {
        /// Snapshot path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ScoutError>;
