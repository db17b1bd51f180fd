//! Behavior tests for the two-tier fetch strategy: fallback transparency,
//! lookback widening, and partial-failure accounting.

use openbell_tests::*;

use openbell_core::FixedClock;
use time::macros::datetime;

fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(datetime!(2025-06-21 04:00 UTC)))
}

fn trading_session(day: &str) -> TradingSession {
    TradingSession::new(date(day), true)
}

fn feed_with_june_history(symbols: &[&str]) -> FakeFeed {
    let mut feed = FakeFeed::new();
    for raw in symbols {
        feed = feed.with_history(
            symbol(raw),
            vec![
                bar("2025-06-19", 100.0, 103.0, 99.0, 102.0, 1_000_000),
                bar("2025-06-20", 102.0, 108.0, 101.0, 107.0, 1_500_000),
            ],
        );
    }
    feed
}

fn router(primary: Option<FakeBroker>, feed: FakeFeed) -> FallbackRouter {
    FallbackRouter::new(
        primary.map(|broker| {
            SourceHandle::new(
                ProviderId::Kite,
                Arc::new(KiteSource::new(Arc::new(broker)).with_clock(fixed_clock())),
            )
        }),
        SourceHandle::new(
            ProviderId::Yahoo,
            Arc::new(YahooSource::new(Arc::new(feed)).with_clock(fixed_clock())),
        ),
    )
}

// =========================================================================
// Fallback transparency
// =========================================================================

#[tokio::test]
async fn auth_failure_is_behaviorally_identical_to_no_primary() {
    // Given: one router whose broker rejects every call, one with no broker
    let universe = vec![symbol("INFY"), symbol("TCS")];
    let session = trading_session("2025-06-20");

    let with_failing_primary = router(
        Some(FakeBroker::failing(SourceError::auth("token expired"))),
        feed_with_june_history(&["INFY", "TCS"]),
    );
    let without_primary = router(None, feed_with_june_history(&["INFY", "TCS"]));

    // When: fetching the same universe through both
    let fallback_set = with_failing_primary
        .fetch_session_quotes(&universe, &session)
        .await
        .expect("fallback must serve");
    let direct_set = without_primary
        .fetch_session_quotes(&universe, &session)
        .await
        .expect("secondary must serve");

    // Then: the quote mappings are identical; only provenance differs
    assert_eq!(fallback_set.quotes, direct_set.quotes);
    assert_eq!(fallback_set.provenance.served_by, Some(ProviderId::Yahoo));
    assert_eq!(
        fallback_set.provenance.source_chain,
        vec![ProviderId::Kite, ProviderId::Yahoo]
    );
    assert_eq!(direct_set.provenance.source_chain, vec![ProviderId::Yahoo]);
}

#[tokio::test]
async fn zero_rows_from_the_broker_triggers_fallback() {
    // Given: a broker that answers but has nothing for the session
    let universe = vec![symbol("INFY")];
    let session = trading_session("2025-06-20");
    let broker = FakeBroker::serving(Vec::new());

    let routed = router(Some(broker), feed_with_june_history(&["INFY"]));

    // When
    let set = routed
        .fetch_session_quotes(&universe, &session)
        .await
        .expect("must serve");

    // Then: the public feed served and said so in provenance
    assert_eq!(set.provenance.served_by, Some(ProviderId::Yahoo));
    assert_eq!(set.len(), 1);
    assert!(set
        .provenance
        .notes
        .iter()
        .any(|note| note.contains("no rows")));
}

#[tokio::test]
async fn a_healthy_broker_is_preferred_over_the_public_feed() {
    let infy = symbol("INFY");
    let universe = vec![infy.clone()];
    let session = trading_session("2025-06-20");

    let broker = FakeBroker::serving(vec![SymbolBar {
        symbol: infy.clone(),
        bar: bar("2025-06-20", 1500.0, 1540.0, 1480.0, 1532.0, 4_000_000),
    }]);

    let set = router(Some(broker), feed_with_june_history(&["INFY"]))
        .fetch_session_quotes(&universe, &session)
        .await
        .expect("must serve");

    assert_eq!(set.provenance.served_by, Some(ProviderId::Kite));
    let quote = set.quotes.get(&infy).expect("broker row present");
    assert_eq!(quote.volume, 4_000_000);
    // Broker rows carry no previous close; the open is the reference.
    assert_eq!(quote.prev_close, None);
    assert_eq!(quote.reference_price(), 1500.0);
}

// =========================================================================
// Secondary resilience
// =========================================================================

#[tokio::test]
async fn stale_symbols_are_found_by_widening_the_lookback() {
    // Given: a symbol whose last row is three weeks old, visible only in
    // the widest window
    let sparse = symbol("SPARSE");
    let feed = FakeFeed::new().with_history(
        sparse.clone(),
        vec![bar("2025-05-28", 50.0, 52.0, 49.0, 51.0, 200_000)],
    );

    let set = router(None, feed)
        .fetch_session_quotes(&[sparse.clone()], &trading_session("2025-06-20"))
        .await
        .expect("must serve");

    // Then: the stale row still produces a quote
    let quote = set.quotes.get(&sparse).expect("widened window finds it");
    assert_eq!(quote.close, 51.0);
    assert_eq!(set.provenance.dropped, 0);
}

#[tokio::test]
async fn symbols_without_data_in_any_window_are_dropped_and_counted() {
    // Given: one listed symbol and one the feed has never heard of
    let universe = vec![symbol("INFY"), symbol("GHOST")];

    let set = router(None, feed_with_june_history(&["INFY"]))
        .fetch_session_quotes(&universe, &trading_session("2025-06-20"))
        .await
        .expect("must serve");

    // Then: the ghost is absent, and requested - returned == dropped
    assert_eq!(set.len(), 1);
    assert!(!set.quotes.contains_key(&symbol("GHOST")));
    assert_eq!(set.provenance.requested - set.len(), set.provenance.dropped);
}

#[tokio::test]
async fn invalid_rows_are_dropped_not_zeroed() {
    // Given: a feed row with an inverted high/low range
    let broken = symbol("BROKEN");
    let mut history = FakeFeed::new();
    history.histories.insert(
        broken.clone(),
        vec![SessionBar {
            date: date("2025-06-20"),
            open: 100.0,
            high: 90.0,
            low: 110.0,
            close: 100.0,
            volume: 1_000_000,
        }],
    );

    let set = router(None, history)
        .fetch_session_quotes(&[broken.clone()], &trading_session("2025-06-20"))
        .await
        .expect("must serve");

    // Then: the row is gone and accounted for, not coerced
    assert!(set.is_empty());
    assert_eq!(set.provenance.dropped, 1);
}

#[tokio::test]
async fn volume_floor_is_applied_with_provenance_accounting() {
    let universe = vec![symbol("INFY"), symbol("TINY")];
    let feed = feed_with_june_history(&["INFY"]).with_history(
        symbol("TINY"),
        vec![bar("2025-06-20", 10.0, 10.5, 9.8, 10.2, 40_000)],
    );

    let routed = router(None, feed).with_volume_floor(Some(75_000));
    let set = routed
        .fetch_session_quotes(&universe, &trading_session("2025-06-20"))
        .await
        .expect("must serve");

    assert_eq!(set.len(), 1);
    assert_eq!(set.provenance.dropped, 1);
    assert!(set
        .provenance
        .notes
        .iter()
        .any(|note| note.contains("volume floor")));
}
