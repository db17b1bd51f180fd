//! CLI argument definitions for openbell.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `analyze` | Rank a stock universe by last-session interest |
//! | `calendar` | Resolve the last trading day and session phase |
//! | `sources` | Show the configured data providers |

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Pre-market interest ranking over a stock universe.
///
/// Scores the last completed trading session's volume, price movement, and
/// intraday range into a 0-100 composite per symbol, fetching data from the
/// public chart feed (the authenticated broker feed is wired in embedding
/// applications that hold a live session).
#[derive(Debug, Parser)]
#[command(name = "openbell", version, about = "Pre-market interest ranking")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table for terminal display.
    Table,
    /// JSON report envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rank symbols by last-session pre-market interest.
    Analyze(AnalyzeArgs),
    /// Resolve the last trading day for a reference date.
    Calendar(CalendarArgs),
    /// Show configured data providers and their policies.
    Sources(SourcesArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Symbols to analyze; defaults to the high-liquidity focus universe.
    pub symbols: Vec<String>,

    /// Analyze the session on or before this date (YYYY-MM-DD) instead of
    /// the most recent one.
    #[arg(long)]
    pub date: Option<String>,

    /// Only show the top N rows.
    #[arg(long)]
    pub top: Option<usize>,

    /// Drop rows below this traded-volume floor.
    #[arg(long)]
    pub min_volume: Option<u64>,

    /// Exchange suffix appended to tickers on the public feed.
    #[arg(long, default_value = ".NS")]
    pub suffix: String,
}

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// Reference date (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {}
