//! Behavior tests for trading-day resolution.

use openbell_tests::*;

use openbell_core::nse_holidays_2025;
use time::macros::datetime;
use time::Weekday;

fn nse_calendar() -> TradingCalendar {
    TradingCalendar::new(nse_holidays_2025(), MarketHours::default())
}

#[test]
fn every_weekend_reference_resolves_to_a_weekday_before_it() {
    // Given: a plain weekday/holiday calendar
    let calendar = nse_calendar();

    // When: resolving from each Saturday and Sunday of June 2025
    for day in ["2025-06-07", "2025-06-08", "2025-06-14", "2025-06-15"] {
        let reference = date(day);
        let session = calendar
            .resolve_on_or_before(reference)
            .expect("weekend must resolve");

        // Then: the resolved date is a weekday strictly before the weekend
        assert!(session.date() < reference);
        assert!(!matches!(
            session.date().weekday(),
            Weekday::Saturday | Weekday::Sunday
        ));
    }
}

#[test]
fn holiday_dates_are_never_returned_even_on_weekdays() {
    let calendar = nse_calendar();

    for holiday in nse_holidays_2025() {
        let session = calendar
            .resolve_on_or_before(holiday)
            .expect("holiday must resolve to an earlier day");
        assert_ne!(session.date(), holiday);
        assert!(!nse_holidays_2025().contains(&session.date()));
    }
}

#[test]
fn weekend_holiday_skips_both_conditions_independently() {
    // Republic Day 2025 falls on a Sunday: weekday rule and holiday rule
    // both reject it, and neither masks the other.
    let calendar = nse_calendar();
    let republic_day = date("2025-01-26");

    assert!(!calendar.is_trading_day(republic_day));
    assert!(republic_day.is_weekend());

    let session = calendar
        .resolve_on_or_before(republic_day)
        .expect("must resolve");
    assert_eq!(session.date(), date("2025-01-24"));
}

#[test]
fn premarket_clock_reference_analyzes_the_previous_session() {
    let calendar = nse_calendar();

    // 09:05 IST on a trading Tuesday is pre-market; Tuesday has not traded.
    let session = calendar
        .resolve_last_trading_day(datetime!(2025-06-24 9:05 +5:30))
        .expect("must resolve");
    assert_eq!(session.date(), date("2025-06-23"));

    // After the close the same Tuesday is the last completed session.
    let session = calendar
        .resolve_last_trading_day(datetime!(2025-06-24 16:00 +5:30))
        .expect("must resolve");
    assert_eq!(session.date(), date("2025-06-24"));

    // A UTC clock resolves identically once converted: 03:40 UTC is
    // 09:10 IST, still pre-market.
    let session = calendar
        .resolve_last_trading_day(datetime!(2025-06-24 3:40 UTC))
        .expect("must resolve");
    assert_eq!(session.date(), date("2025-06-23"));
}

#[test]
fn a_malformed_holiday_set_fails_fast_instead_of_looping() {
    // Given: every day of July blocked out
    let holidays = (1..=31)
        .map(|day| date(&format!("2025-07-{day:02}")))
        .collect();
    let calendar = TradingCalendar::new(holidays, MarketHours::default());

    // When / Then: resolution reports a configuration error
    let err = calendar
        .resolve_on_or_before(date("2025-07-31"))
        .expect_err("search must exhaust");
    assert!(err.to_string().contains("holiday set is malformed"));
}
