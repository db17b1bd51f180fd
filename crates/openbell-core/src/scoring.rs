//! Banded 0-100 scoring of one session's observed metrics.

use serde::{Deserialize, Serialize};

use crate::SymbolQuote;

/// Points awarded per band, highest band first.
const VOLUME_POINTS: [u8; 4] = [40, 30, 20, 10];
const MOVEMENT_POINTS: [u8; 4] = [30, 25, 15, 5];
const VOLATILITY_POINTS: [u8; 4] = [30, 25, 15, 5];

/// Numeric breakpoints for the band tables and the category mapping.
/// Injected as data so the engine is testable with synthetic thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreThresholds {
    pub volume_very_high: u64,
    pub volume_high: u64,
    pub volume_floor: u64,
    pub movement_strong: f64,
    pub movement_notable: f64,
    pub movement_mild: f64,
    pub range_wide: f64,
    pub range_elevated: f64,
    pub range_modest: f64,
    pub priority_very_high: u8,
    pub priority_high: u8,
    pub priority_medium: u8,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            volume_very_high: 5_000_000,
            volume_high: 1_000_000,
            volume_floor: 75_000,
            movement_strong: 5.0,
            movement_notable: 3.0,
            movement_mild: 1.0,
            range_wide: 8.0,
            range_elevated: 5.0,
            range_modest: 3.0,
            priority_very_high: 80,
            priority_high: 60,
            priority_medium: 40,
        }
    }
}

/// Watchlist priority derived from the composite total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Display bucket for raw traded volume. Shares the volume breakpoints with
/// the score bands so the two classifications agree on boundary values by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeBucket {
    VeryHigh,
    High,
    Medium,
    Low,
}

impl VolumeBucket {
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryHigh => "Very High",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Per-quote score decomposition. Composite is the plain sum of the three
/// components; the bands are exhaustive and non-overlapping, so the total
/// lands in [20, 100] without clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub volume_score: u8,
    pub movement_score: u8,
    pub volatility_score: u8,
    pub composite: u8,
    pub priority: Priority,
    pub volume_bucket: VolumeBucket,
    /// Signed movement; scoring uses the absolute value.
    pub movement_pct: f64,
    pub volatility_pct: f64,
}

/// Pure scoring function over validated quotes. Total: no failure modes.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    thresholds: ScoreThresholds,
}

impl ScoringEngine {
    pub fn new(thresholds: ScoreThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ScoreThresholds {
        &self.thresholds
    }

    pub fn score(&self, quote: &SymbolQuote) -> ScoreBreakdown {
        let movement_pct = quote.price_change_pct();
        let volatility_pct = quote.volatility_pct();

        let volume_score = self.volume_points(quote.volume);
        let movement_score = self.movement_points(movement_pct.abs());
        let volatility_score = self.volatility_points(volatility_pct);
        let composite = volume_score + movement_score + volatility_score;

        ScoreBreakdown {
            volume_score,
            movement_score,
            volatility_score,
            composite,
            priority: self.priority_for(composite),
            volume_bucket: self.volume_bucket(quote.volume),
            movement_pct,
            volatility_pct,
        }
    }

    pub fn volume_bucket(&self, volume: u64) -> VolumeBucket {
        let t = &self.thresholds;
        if volume >= t.volume_very_high {
            VolumeBucket::VeryHigh
        } else if volume >= t.volume_high {
            VolumeBucket::High
        } else if volume >= t.volume_floor {
            VolumeBucket::Medium
        } else {
            VolumeBucket::Low
        }
    }

    fn volume_points(&self, volume: u64) -> u8 {
        let t = &self.thresholds;
        if volume >= t.volume_very_high {
            VOLUME_POINTS[0]
        } else if volume >= t.volume_high {
            VOLUME_POINTS[1]
        } else if volume >= t.volume_floor {
            VOLUME_POINTS[2]
        } else {
            VOLUME_POINTS[3]
        }
    }

    fn movement_points(&self, abs_movement_pct: f64) -> u8 {
        let t = &self.thresholds;
        if abs_movement_pct >= t.movement_strong {
            MOVEMENT_POINTS[0]
        } else if abs_movement_pct >= t.movement_notable {
            MOVEMENT_POINTS[1]
        } else if abs_movement_pct >= t.movement_mild {
            MOVEMENT_POINTS[2]
        } else {
            MOVEMENT_POINTS[3]
        }
    }

    fn volatility_points(&self, volatility_pct: f64) -> u8 {
        let t = &self.thresholds;
        if volatility_pct >= t.range_wide {
            VOLATILITY_POINTS[0]
        } else if volatility_pct >= t.range_elevated {
            VOLATILITY_POINTS[1]
        } else if volatility_pct >= t.range_modest {
            VOLATILITY_POINTS[2]
        } else {
            VOLATILITY_POINTS[3]
        }
    }

    fn priority_for(&self, composite: u8) -> Priority {
        let t = &self.thresholds;
        if composite >= t.priority_very_high {
            Priority::VeryHigh
        } else if composite >= t.priority_high {
            Priority::High
        } else if composite >= t.priority_medium {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Symbol, SymbolQuote, UtcDateTime};

    fn quote(volume: u64, close: f64, prev_close: f64, high: f64, low: f64) -> SymbolQuote {
        SymbolQuote::new(
            Symbol::parse("TCS").expect("valid symbol"),
            close,
            prev_close,
            Some(prev_close),
            high,
            low,
            volume,
            UtcDateTime::parse("2025-06-20T16:00:00Z").expect("valid stamp"),
        )
        .expect("valid quote")
    }

    #[test]
    fn maximal_bands_sum_to_one_hundred() {
        // volume 6M, movement 6%, range 9% against a reference of 100.
        let breakdown = ScoringEngine::default().score(&quote(6_000_000, 106.0, 100.0, 107.0, 98.0));

        assert_eq!(breakdown.volume_score, 40);
        assert_eq!(breakdown.movement_score, 30);
        assert_eq!(breakdown.volatility_score, 30);
        assert_eq!(breakdown.composite, 100);
        assert_eq!(breakdown.priority, Priority::VeryHigh);
        assert_eq!(breakdown.volume_bucket, VolumeBucket::VeryHigh);
    }

    #[test]
    fn minimal_bands_sum_to_twenty() {
        // volume 50K, movement 0.5%, range 1%.
        let breakdown =
            ScoringEngine::default().score(&quote(50_000, 100.5, 100.0, 100.8, 99.8));

        assert_eq!(breakdown.volume_score, 10);
        assert_eq!(breakdown.movement_score, 5);
        assert_eq!(breakdown.volatility_score, 5);
        assert_eq!(breakdown.composite, 20);
        assert_eq!(breakdown.priority, Priority::Low);
        assert_eq!(breakdown.volume_bucket, VolumeBucket::Low);
    }

    #[test]
    fn volume_floor_boundary_is_inclusive() {
        let engine = ScoringEngine::default();
        let at_floor = engine.score(&quote(75_000, 100.0, 100.0, 100.5, 99.5));
        let below_floor = engine.score(&quote(74_999, 100.0, 100.0, 100.5, 99.5));

        assert_eq!(at_floor.volume_score, 20);
        assert_eq!(below_floor.volume_score, 10);
        assert_eq!(at_floor.volume_bucket, VolumeBucket::Medium);
        assert_eq!(below_floor.volume_bucket, VolumeBucket::Low);
    }

    #[test]
    fn falling_prices_score_on_absolute_movement() {
        // Close 5% below the reference counts as a strong move.
        let breakdown = ScoringEngine::default().score(&quote(2_000_000, 95.0, 100.0, 100.0, 94.0));
        assert_eq!(breakdown.movement_score, 30);
        assert!(breakdown.movement_pct < 0.0);
    }

    #[test]
    fn category_boundaries_are_inclusive() {
        let engine = ScoringEngine::default();
        // volume >=1M (30) + movement >=5 (30) + range >=5 (25) = 85.
        let very_high = engine.score(&quote(1_000_000, 105.0, 100.0, 105.0, 99.0));
        assert_eq!(very_high.composite, 85);
        assert_eq!(very_high.priority, Priority::VeryHigh);

        // volume >=75K (20) + movement >=3 (25) + range >=3 (15) = 60.
        let high = engine.score(&quote(80_000, 103.0, 100.0, 103.0, 99.5));
        assert_eq!(high.composite, 60);
        assert_eq!(high.priority, Priority::High);

        // volume >=75K (20) + movement >=1 (15) + range >=3 (15) = 50.
        let medium = engine.score(&quote(80_000, 101.0, 100.0, 102.0, 99.0));
        assert_eq!(medium.composite, 50);
        assert_eq!(medium.priority, Priority::Medium);
    }
}
