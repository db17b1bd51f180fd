//! Orchestration: resolve the session, fetch the universe, score every
//! returned quote, rank the result.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::TradingCalendar;
use crate::clock::{Clock, SystemClock};
use crate::config::AnalyzerConfig;
use crate::data_source::{MarketDataPort, Provenance, QuoteSet};
use crate::scoring::{ScoreBreakdown, ScoreThresholds, ScoringEngine, VolumeBucket};
use crate::{AnalyzerError, Symbol, SymbolQuote, TradingDate, TradingSession};

/// One ranked row: the observed quote and its score decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub quote: SymbolQuote,
    pub breakdown: ScoreBreakdown,
}

/// Ranked output of one analysis run. Entries are sorted descending by
/// composite score, ties broken by descending volume; the sort is stable,
/// so re-sorting an already ranked result is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub session: TradingSession,
    pub entries: Vec<RankedEntry>,
    pub provenance: Provenance,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self, count: usize) -> &[RankedEntry] {
        &self.entries[..count.min(self.entries.len())]
    }

    /// Aggregate insight counters over the ranked rows.
    pub fn summary(&self, thresholds: &ScoreThresholds) -> AnalysisSummary {
        let mut summary = AnalysisSummary {
            total: self.entries.len(),
            ..AnalysisSummary::default()
        };

        if let Some(first) = self.entries.first() {
            summary.top_symbol = Some(first.quote.symbol.clone());
            summary.top_score = Some(first.breakdown.composite);
        }

        let mut volume_sum: u128 = 0;
        let mut movement_sum = 0.0;

        for entry in &self.entries {
            match entry.breakdown.volume_bucket {
                VolumeBucket::VeryHigh => summary.very_high_volume += 1,
                VolumeBucket::High => summary.high_volume += 1,
                _ => {}
            }

            let movement = entry.breakdown.movement_pct;
            if movement.abs() >= thresholds.movement_notable {
                summary.big_movers += 1;
            }
            if entry.breakdown.volatility_pct >= thresholds.range_elevated {
                summary.high_volatility += 1;
            }
            if movement > 0.0 {
                summary.gainers += 1;
            } else if movement < 0.0 {
                summary.losers += 1;
            }

            volume_sum += u128::from(entry.quote.volume);
            movement_sum += movement;
        }

        if summary.total > 0 {
            summary.mean_volume = (volume_sum / summary.total as u128) as u64;
            summary.mean_movement_pct = movement_sum / summary.total as f64;
        }

        summary
    }
}

/// Pre-market planning counters derived from one ranked result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub top_symbol: Option<Symbol>,
    pub top_score: Option<u8>,
    pub very_high_volume: usize,
    pub high_volume: usize,
    pub big_movers: usize,
    pub high_volatility: usize,
    pub gainers: usize,
    pub losers: usize,
    pub total: usize,
    pub mean_volume: u64,
    pub mean_movement_pct: f64,
}

/// Pre-market analyzer over an injected calendar, scoring engine, data
/// port, and clock. Holds no mutable state; concurrent `analyze` calls are
/// independent.
pub struct PreMarketAnalyzer {
    calendar: TradingCalendar,
    engine: ScoringEngine,
    port: Arc<dyn MarketDataPort>,
    clock: Arc<dyn Clock>,
}

impl PreMarketAnalyzer {
    pub fn new(
        calendar: TradingCalendar,
        engine: ScoringEngine,
        port: Arc<dyn MarketDataPort>,
    ) -> Self {
        Self {
            calendar,
            engine,
            port,
            clock: Arc::new(SystemClock),
        }
    }

    /// Wire calendar and engine from aggregated configuration.
    pub fn from_config(config: &AnalyzerConfig, port: Arc<dyn MarketDataPort>) -> Self {
        Self::new(
            TradingCalendar::new(config.holidays.clone(), config.hours),
            ScoringEngine::new(config.thresholds.clone()),
            port,
        )
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn thresholds(&self) -> &ScoreThresholds {
        self.engine.thresholds()
    }

    /// Rank the universe by last-session interest.
    ///
    /// Resolves the effective session from `target` when supplied, else from
    /// the injected clock. Symbols without retrievable data are omitted and
    /// counted in provenance; only calendar configuration faults surface as
    /// errors.
    pub async fn analyze(
        &self,
        universe: &[Symbol],
        target: Option<TradingDate>,
    ) -> Result<RankedResult, AnalyzerError> {
        let session = match target {
            Some(date) => self.calendar.resolve_on_or_before(date)?,
            None => self
                .calendar
                .resolve_last_trading_day(self.clock.now_utc())?,
        };

        debug!(date = %session.date(), universe = universe.len(), "analyzing session");

        let quote_set = match self.port.fetch_session_quotes(universe, &session).await {
            Ok(set) => set,
            Err(err) => {
                warn!(error = %err, date = %session.date(), "market data unavailable, returning empty result");
                QuoteSet::unavailable(universe.len(), Vec::new(), err.to_string())
            }
        };

        let QuoteSet { quotes, provenance } = quote_set;

        let mut entries: Vec<RankedEntry> = quotes
            .into_values()
            .map(|quote| {
                let breakdown = self.engine.score(&quote);
                RankedEntry { quote, breakdown }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.breakdown
                .composite
                .cmp(&a.breakdown.composite)
                .then_with(|| b.quote.volume.cmp(&a.quote.volume))
        });

        debug!(
            rows = entries.len(),
            dropped = provenance.dropped,
            served_by = provenance.served_by.map(|p| p.as_str()).unwrap_or("none"),
            "analysis complete"
        );

        Ok(RankedResult {
            session,
            entries,
            provenance,
        })
    }
}
