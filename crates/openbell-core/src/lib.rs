//! Core engine for openbell.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - Trading-calendar resolution over an injected holiday set
//! - Data port traits/adapters with two-tier fallback routing
//! - The banded 0-100 pre-market interest scoring
//! - The analyzer orchestrating one ranked result per call

pub mod adapters;
pub mod analyzer;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod policy;
pub mod routing;
pub mod scoring;
pub mod source;
pub mod throttling;

pub use adapters::{BrokerSession, ChartFeed, KiteSource, SymbolBar, YahooChartClient, YahooSource};
pub use analyzer::{AnalysisSummary, PreMarketAnalyzer, RankedEntry, RankedResult};
pub use calendar::{MarketHours, SessionPhase, TradingCalendar};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{default_universe, nse_holidays_2025, AnalyzerConfig};
pub use data_source::{
    BoxFuture, MarketDataPort, Provenance, QuoteSet, SourceError, SourceErrorKind,
};
pub use domain::{SessionBar, Symbol, SymbolQuote, TradingDate, TradingSession, UtcDateTime};
pub use error::{AnalyzerError, CalendarError, ValidationError};
pub use policy::{BackoffPolicy, ProviderPolicy};
pub use routing::{FallbackRouter, SourceHandle};
pub use scoring::{Priority, ScoreBreakdown, ScoreThresholds, ScoringEngine, VolumeBucket};
pub use source::ProviderId;
pub use throttling::RateGate;
