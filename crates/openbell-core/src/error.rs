use thiserror::Error;

use crate::domain::TradingDate;

/// Validation errors raised when constructing domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid calendar date, expected YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("invalid provider '{value}', expected one of kite, yahoo")]
    InvalidProvider { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("session high must be >= session low")]
    RangeInverted,
    #[error("quote has no usable reference price (previous close and open are both <= 0)")]
    NoReferencePrice,
}

/// Fatal calendar-resolution failures. These indicate broken configuration
/// (an absurdly dense holiday set) and are never retried or degraded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error(
        "no trading day found within {steps} days before {reference}; holiday set is malformed"
    )]
    SearchExhausted { reference: TradingDate, steps: u8 },
}

/// The only error class an `analyze` call surfaces. Provider outages and
/// per-symbol data gaps degrade the result set instead (see `Provenance`).
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}
