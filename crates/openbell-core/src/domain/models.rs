use serde::{Deserialize, Serialize};

use crate::{TradingDate, UtcDateTime, ValidationError};

use super::Symbol;

/// A resolved calendar date together with its trading-day classification.
/// Immutable once computed for a given date and holiday set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingSession {
    pub date: TradingDate,
    pub is_trading_day: bool,
}

impl TradingSession {
    pub const fn new(date: TradingDate, is_trading_day: bool) -> Self {
        Self {
            date,
            is_trading_day,
        }
    }

    pub const fn date(&self) -> TradingDate {
        self.date
    }
}

/// Daily OHLCV row as delivered by a provider, before quote assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionBar {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl SessionBar {
    pub fn new(
        date: TradingDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_price("open", open)?;
        validate_price("high", high)?;
        validate_price("low", low)?;
        validate_price("close", close)?;

        if high < low {
            return Err(ValidationError::RangeInverted);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// One symbol's observed facts for a single session.
///
/// Construction enforces the quote hygiene contract: prices are finite and
/// non-negative, `high >= low`, and a usable reference price exists. Rows
/// violating it are dropped by the data port, never zeroed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolQuote {
    pub symbol: Symbol,
    pub close: f64,
    pub open: f64,
    /// Previous session close, when the provider's window exposes it.
    pub prev_close: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
    pub as_of: UtcDateTime,
}

impl SymbolQuote {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        close: f64,
        open: f64,
        prev_close: Option<f64>,
        high: f64,
        low: f64,
        volume: u64,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_price("close", close)?;
        validate_price("open", open)?;
        validate_price("high", high)?;
        validate_price("low", low)?;
        if let Some(prev) = prev_close {
            validate_price("prev_close", prev)?;
        }

        if high < low {
            return Err(ValidationError::RangeInverted);
        }

        let has_reference = prev_close.is_some_and(|prev| prev > 0.0) || open > 0.0;
        if !has_reference {
            return Err(ValidationError::NoReferencePrice);
        }

        Ok(Self {
            symbol,
            close,
            open,
            prev_close,
            high,
            low,
            volume,
            as_of,
        })
    }

    /// Assemble a quote from a provider bar plus the preceding session's close.
    pub fn from_daily_bar(
        symbol: Symbol,
        bar: &SessionBar,
        prev_close: Option<f64>,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        Self::new(
            symbol, bar.close, bar.open, prev_close, bar.high, bar.low, bar.volume, as_of,
        )
    }

    /// Baseline for percentage metrics: previous close when positive, else
    /// the session open. Guaranteed positive by construction.
    pub fn reference_price(&self) -> f64 {
        match self.prev_close {
            Some(prev) if prev > 0.0 => prev,
            _ => self.open,
        }
    }

    pub fn price_change(&self) -> f64 {
        self.close - self.reference_price()
    }

    /// Signed percentage movement of the close against the reference price.
    pub fn price_change_pct(&self) -> f64 {
        self.price_change() / self.reference_price() * 100.0
    }

    /// Intraday range as a percentage of the reference price.
    pub fn volatility_pct(&self) -> f64 {
        (self.high - self.low) / self.reference_price() * 100.0
    }
}

fn validate_price(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
