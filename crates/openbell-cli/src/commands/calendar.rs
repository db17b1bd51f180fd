use serde::Serialize;

use openbell_core::{
    AnalyzerConfig, Clock, SessionPhase, SystemClock, TradingCalendar, TradingDate, TradingSession,
};

use crate::cli::CalendarArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

#[derive(Debug, Serialize)]
struct CalendarData {
    session: TradingSession,
    phase: SessionPhase,
}

pub fn run(args: &CalendarArgs) -> Result<CommandOutput, CliError> {
    let config = AnalyzerConfig::default();
    let calendar = TradingCalendar::new(config.holidays.clone(), config.hours);

    let now = SystemClock.now_utc();
    let session = match args.date.as_deref() {
        Some(raw) => calendar.resolve_on_or_before(TradingDate::parse(raw)?),
        None => calendar.resolve_last_trading_day(now),
    }
    .map_err(openbell_core::AnalyzerError::from)?;

    let phase = calendar.hours().phase_at_instant(now);

    let table = vec![
        format!("last trading day: {}", session.date()),
        format!("session phase now: {}", phase.as_str()),
    ];

    let data = CalendarData { session, phase };
    Ok(CommandOutput::new(serde_json::to_value(data)?, table))
}
