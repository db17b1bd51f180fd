//! Static analysis configuration: holiday calendar, exchange timings,
//! scoring breakpoints, and the default focus universe. All of it is
//! injected data; nothing here is computed at analysis time.

use std::collections::BTreeSet;

use time::macros::date;

use crate::calendar::MarketHours;
use crate::scoring::ScoreThresholds;
use crate::{Symbol, TradingDate};

/// Aggregated configuration for wiring an analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub holidays: BTreeSet<TradingDate>,
    pub hours: MarketHours,
    pub thresholds: ScoreThresholds,
    /// Optional floor on traded volume; rows below it are dropped at the
    /// data port and counted in provenance. `None` keeps every row so the
    /// lowest volume band stays reachable.
    pub min_volume: Option<u64>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            holidays: nse_holidays_2025(),
            hours: MarketHours::default(),
            thresholds: ScoreThresholds::default(),
            min_volume: None,
        }
    }
}

/// Major NSE trading holidays for 2025.
pub fn nse_holidays_2025() -> BTreeSet<TradingDate> {
    [
        date!(2025 - 01 - 26), // Republic Day
        date!(2025 - 03 - 14), // Holi
        date!(2025 - 04 - 18), // Good Friday
        date!(2025 - 08 - 15), // Independence Day
        date!(2025 - 10 - 02), // Gandhi Jayanti
        date!(2025 - 11 - 01), // Diwali
        date!(2025 - 12 - 25), // Christmas
    ]
    .into_iter()
    .map(TradingDate::from)
    .collect()
}

/// High-liquidity NSE symbols most relevant when no universe is supplied.
pub fn default_universe() -> Vec<Symbol> {
    const FOCUS: [&str; 48] = [
        "RELIANCE",
        "TCS",
        "HDFCBANK",
        "INFY",
        "HINDUNILVR",
        "ICICIBANK",
        "BHARTIARTL",
        "ITC",
        "SBIN",
        "LT",
        "ASIANPAINT",
        "AXISBANK",
        "KOTAKBANK",
        "MARUTI",
        "BAJFINANCE",
        "BAJAJFINSV",
        "HCLTECH",
        "WIPRO",
        "TECHM",
        "DMART",
        "SUNPHARMA",
        "DRREDDY",
        "CIPLA",
        "DIVISLAB",
        "TITAN",
        "ULTRACEMCO",
        "GRASIM",
        "NESTLEIND",
        "BRITANNIA",
        "TATACONSUM",
        "POWERGRID",
        "NTPC",
        "ONGC",
        "BPCL",
        "GAIL",
        "TATAMOTORS",
        "BAJAJ-AUTO",
        "HEROMOTOCO",
        "EICHERMOT",
        "TATASTEEL",
        "JSWSTEEL",
        "HINDALCO",
        "COALINDIA",
        "ADANIPORTS",
        "INDUSINDBK",
        "SBILIFE",
        "HDFCLIFE",
        "INDIGO",
    ];

    FOCUS
        .iter()
        .map(|raw| Symbol::parse(raw).expect("focus universe symbols are valid"))
        .collect()
}
