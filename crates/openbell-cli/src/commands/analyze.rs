use std::sync::Arc;

use serde::Serialize;

use openbell_core::{
    default_universe, AnalysisSummary, AnalyzerConfig, FallbackRouter, PreMarketAnalyzer,
    ProviderId, RankedResult, SourceHandle, Symbol, TradingDate, YahooChartClient, YahooSource,
};

use crate::cli::AnalyzeArgs;
use crate::error::CliError;
use crate::output::{format_volume, CommandOutput};

#[derive(Debug, Serialize)]
struct AnalyzeData {
    result: RankedResult,
    summary: AnalysisSummary,
}

pub async fn run(args: &AnalyzeArgs) -> Result<CommandOutput, CliError> {
    let universe = if args.symbols.is_empty() {
        default_universe()
    } else {
        args.symbols
            .iter()
            .map(|raw| Symbol::parse(raw))
            .collect::<Result<Vec<_>, _>>()?
    };

    let target = args
        .date
        .as_deref()
        .map(TradingDate::parse)
        .transpose()?;

    let config = AnalyzerConfig {
        min_volume: args.min_volume,
        ..AnalyzerConfig::default()
    };

    // The CLI holds no broker session, so the router runs public-feed only;
    // embedders with a live connection plug a KiteSource in as primary.
    let feed = Arc::new(YahooChartClient::new().with_symbol_suffix(args.suffix.clone()));
    let router = FallbackRouter::new(
        None,
        SourceHandle::new(ProviderId::Yahoo, Arc::new(YahooSource::new(feed))),
    )
    .with_volume_floor(config.min_volume);

    let analyzer = PreMarketAnalyzer::from_config(&config, Arc::new(router));
    let mut result = analyzer.analyze(&universe, target).await?;
    let summary = result.summary(analyzer.thresholds());

    if let Some(top) = args.top {
        result.entries.truncate(top);
    }

    let table = render_table(&result, &summary);
    let warnings = result.provenance.notes.clone();
    let data = AnalyzeData { result, summary };

    Ok(CommandOutput::new(serde_json::to_value(data)?, table).with_warnings(warnings))
}

fn render_table(result: &RankedResult, summary: &AnalysisSummary) -> Vec<String> {
    let mut lines = Vec::with_capacity(result.len() + 6);

    lines.push(format!(
        "session {}  ({} of {} symbols, {} dropped, served by {})",
        result.session.date(),
        result.len(),
        result.provenance.requested,
        result.provenance.dropped,
        result
            .provenance
            .served_by
            .map(|p| p.as_str())
            .unwrap_or("none"),
    ));
    lines.push(String::new());
    lines.push(format!(
        "{:<4} {:<12} {:>10} {:>8} {:>8} {:>8} {:>6}  {:<10} {:<10}",
        "#", "SYMBOL", "CLOSE", "VOLUME", "MOVE%", "RANGE%", "SCORE", "PRIORITY", "VOLUME CAT"
    ));

    for (rank, entry) in result.entries.iter().enumerate() {
        lines.push(format!(
            "{:<4} {:<12} {:>10.2} {:>8} {:>8.2} {:>8.2} {:>6}  {:<10} {:<10}",
            rank + 1,
            entry.quote.symbol.as_str(),
            entry.quote.close,
            format_volume(entry.quote.volume),
            entry.breakdown.movement_pct,
            entry.breakdown.volatility_pct,
            entry.breakdown.composite,
            entry.breakdown.priority.label(),
            entry.breakdown.volume_bucket.label(),
        ));
    }

    if summary.total > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{} gainers / {} losers; {} big movers, {} high volatility, avg volume {}",
            summary.gainers,
            summary.losers,
            summary.big_movers,
            summary.high_volatility,
            format_volume(summary.mean_volume),
        ));
    }

    lines
}
