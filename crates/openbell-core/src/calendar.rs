//! Trading-day resolution over a weekday rule and a static holiday set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, Time, UtcOffset};
use tracing::debug;

use crate::error::CalendarError;
use crate::{TradingDate, TradingSession};

/// Upper bound on the backward search. Exceeding it means the holiday set
/// is malformed or absurdly dense, which is a configuration fault.
const MAX_LOOKBACK_DAYS: u8 = 14;

/// Exchange session timings, injected as configuration. The times are wall
/// clock at the exchange; `offset` carries the exchange's UTC offset so
/// reference instants from any clock compare correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    pub pre_open: Time,
    pub open: Time,
    pub close: Time,
    pub post_close: Time,
    pub offset: UtcOffset,
}

impl Default for MarketHours {
    /// NSE timings (IST): pre-market 09:00, open 09:15, close 15:30,
    /// post 16:00.
    fn default() -> Self {
        Self {
            pre_open: time::macros::time!(9:00),
            open: time::macros::time!(9:15),
            close: time::macros::time!(15:30),
            post_close: time::macros::time!(16:00),
            offset: time::macros::offset!(+5:30),
        }
    }
}

/// Intraday phase of the exchange at a given time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Closed,
    PreMarket,
    Regular,
    PostMarket,
}

impl SessionPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::PreMarket => "pre_market",
            Self::Regular => "regular",
            Self::PostMarket => "post_market",
        }
    }
}

impl MarketHours {
    /// Classify an instant from any clock by converting it to exchange
    /// wall time first.
    pub fn phase_at_instant(&self, instant: OffsetDateTime) -> SessionPhase {
        self.phase_at(instant.to_offset(self.offset).time())
    }

    /// Classify an exchange-local time of day.
    pub fn phase_at(&self, time_of_day: Time) -> SessionPhase {
        if time_of_day < self.pre_open {
            SessionPhase::Closed
        } else if time_of_day < self.open {
            SessionPhase::PreMarket
        } else if time_of_day < self.close {
            SessionPhase::Regular
        } else if time_of_day < self.post_close {
            SessionPhase::PostMarket
        } else {
            SessionPhase::Closed
        }
    }

    pub fn is_premarket(&self, time_of_day: Time) -> bool {
        self.phase_at(time_of_day) == SessionPhase::PreMarket
    }
}

/// Resolves "the last completed trading day" for an arbitrary reference
/// moment. Pure function of the injected holiday set and market hours.
#[derive(Debug, Clone)]
pub struct TradingCalendar {
    holidays: BTreeSet<TradingDate>,
    hours: MarketHours,
}

impl TradingCalendar {
    pub fn new(holidays: BTreeSet<TradingDate>, hours: MarketHours) -> Self {
        Self { holidays, hours }
    }

    pub fn hours(&self) -> &MarketHours {
        &self.hours
    }

    /// Weekday Monday through Friday and not in the holiday set. The two
    /// conditions are checked independently so a holiday landing on a
    /// weekend is excluded for both reasons.
    pub fn is_trading_day(&self, date: TradingDate) -> bool {
        let weekday_ok = !date.is_weekend();
        let not_holiday = !self.holidays.contains(&date);
        weekday_ok && not_holiday
    }

    pub fn classify(&self, date: TradingDate) -> TradingSession {
        TradingSession::new(date, self.is_trading_day(date))
    }

    /// Resolve the session to analyze for a reference moment. The instant
    /// is converted to exchange wall time first; the reference date itself
    /// qualifies only once its session has opened, since before the open
    /// that day has not traded yet and the search starts the day before.
    pub fn resolve_last_trading_day(
        &self,
        reference: OffsetDateTime,
    ) -> Result<TradingSession, CalendarError> {
        let local = reference.to_offset(self.hours.offset);
        let date = TradingDate::from(local.date());
        let session_started = local.time() >= self.hours.open;

        let start = if self.is_trading_day(date) && session_started {
            date
        } else {
            date.previous_day()
                .ok_or(CalendarError::SearchExhausted {
                    reference: date,
                    steps: 0,
                })?
        };

        let session = self.resolve_on_or_before(start)?;
        debug!(reference = %date, resolved = %session.date(), "resolved last trading day");
        Ok(session)
    }

    /// Walk backward from `start` (inclusive) to the nearest trading day,
    /// within the bounded search window.
    pub fn resolve_on_or_before(
        &self,
        start: TradingDate,
    ) -> Result<TradingSession, CalendarError> {
        let mut candidate = start;
        let mut steps: u8 = 0;

        while !self.is_trading_day(candidate) {
            steps += 1;
            if steps > MAX_LOOKBACK_DAYS {
                return Err(CalendarError::SearchExhausted {
                    reference: start,
                    steps: MAX_LOOKBACK_DAYS,
                });
            }

            candidate = candidate
                .previous_day()
                .ok_or(CalendarError::SearchExhausted {
                    reference: start,
                    steps,
                })?;
        }

        Ok(TradingSession::new(candidate, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn calendar_with(holidays: &[&str]) -> TradingCalendar {
        let set = holidays
            .iter()
            .map(|raw| TradingDate::parse(raw).expect("valid holiday date"))
            .collect();
        TradingCalendar::new(set, MarketHours::default())
    }

    #[test]
    fn weekend_resolves_to_prior_friday() {
        let calendar = calendar_with(&[]);
        // Sunday 2025-06-22.
        let session = calendar
            .resolve_last_trading_day(datetime!(2025-06-22 11:00 UTC))
            .expect("must resolve");
        assert_eq!(session.date().to_string(), "2025-06-20");
    }

    #[test]
    fn weekday_holiday_is_skipped() {
        // Good Friday 2025-04-18, resolving on Saturday the 19th.
        let calendar = calendar_with(&["2025-04-18"]);
        let session = calendar
            .resolve_last_trading_day(datetime!(2025-04-19 10:00 UTC))
            .expect("must resolve");
        assert_eq!(session.date().to_string(), "2025-04-17");
    }

    #[test]
    fn holiday_on_weekend_skips_both_conditions() {
        // Republic Day 2025-01-26 is a Sunday; both rules reject it.
        let calendar = calendar_with(&["2025-01-26"]);
        assert!(!calendar.is_trading_day(
            TradingDate::parse("2025-01-26").expect("valid date")
        ));

        let session = calendar
            .resolve_last_trading_day(datetime!(2025-01-26 12:00 UTC))
            .expect("must resolve");
        assert_eq!(session.date().to_string(), "2025-01-24");
    }

    #[test]
    fn premarket_reference_excludes_the_same_day() {
        let calendar = calendar_with(&[]);
        // Tuesday 09:05 IST, before the 09:15 open: Tuesday has not traded
        // yet.
        let session = calendar
            .resolve_last_trading_day(datetime!(2025-06-24 9:05 +5:30))
            .expect("must resolve");
        assert_eq!(session.date().to_string(), "2025-06-23");
    }

    #[test]
    fn post_close_reference_includes_the_same_day() {
        let calendar = calendar_with(&[]);
        let session = calendar
            .resolve_last_trading_day(datetime!(2025-06-24 16:30 +5:30))
            .expect("must resolve");
        assert_eq!(session.date().to_string(), "2025-06-24");
    }

    #[test]
    fn utc_instants_are_converted_to_exchange_time() {
        let calendar = calendar_with(&[]);

        // 03:30 UTC is 09:00 IST, before the open: previous session.
        let session = calendar
            .resolve_last_trading_day(datetime!(2025-06-24 3:30 UTC))
            .expect("must resolve");
        assert_eq!(session.date().to_string(), "2025-06-23");

        // 04:00 UTC is 09:30 IST, after the open: the day itself.
        let session = calendar
            .resolve_last_trading_day(datetime!(2025-06-24 4:00 UTC))
            .expect("must resolve");
        assert_eq!(session.date().to_string(), "2025-06-24");
    }

    #[test]
    fn dense_holiday_set_is_a_fatal_configuration_error() {
        // Three weeks of consecutive holidays exhaust the search bound.
        let holidays: Vec<String> = (1..=21)
            .map(|day| format!("2025-07-{day:02}"))
            .collect();
        let refs: Vec<&str> = holidays.iter().map(String::as_str).collect();
        let calendar = calendar_with(&refs);

        let err = calendar
            .resolve_last_trading_day(datetime!(2025-07-21 12:00 UTC))
            .expect_err("must exhaust");
        assert!(matches!(err, CalendarError::SearchExhausted { .. }));
    }

    #[test]
    fn phase_classification_follows_exchange_timings() {
        let hours = MarketHours::default();
        assert_eq!(hours.phase_at(time::macros::time!(8:30)), SessionPhase::Closed);
        assert_eq!(hours.phase_at(time::macros::time!(9:05)), SessionPhase::PreMarket);
        assert!(hours.is_premarket(time::macros::time!(9:14)));
        assert_eq!(hours.phase_at(time::macros::time!(12:00)), SessionPhase::Regular);
        assert_eq!(hours.phase_at(time::macros::time!(15:45)), SessionPhase::PostMarket);
        assert_eq!(hours.phase_at(time::macros::time!(18:00)), SessionPhase::Closed);
    }

    #[test]
    fn phase_of_an_instant_uses_the_exchange_offset() {
        let hours = MarketHours::default();
        // 03:35 UTC is 09:05 IST.
        assert_eq!(
            hours.phase_at_instant(datetime!(2025-06-24 3:35 UTC)),
            SessionPhase::PreMarket
        );
        // 06:30 UTC is 12:00 IST.
        assert_eq!(
            hours.phase_at_instant(datetime!(2025-06-24 6:30 UTC)),
            SessionPhase::Regular
        );
    }
}
