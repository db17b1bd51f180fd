//! Secondary strategy: the public Yahoo chart feed, queried per symbol
//! over successively wider lookback windows.
//!
//! Per-symbol failures here are tolerated and accounted, never escalated:
//! a symbol without rows in the widest window is simply absent from the
//! mapping. Transport hiccups retry with bounded backoff first.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::data_source::{BoxFuture, MarketDataPort, QuoteSet, SourceError};
use crate::policy::ProviderPolicy;
use crate::throttling::RateGate;
use crate::{ProviderId, SessionBar, Symbol, SymbolQuote, TradingDate, TradingSession, UtcDateTime};

/// Daily-history capability of the public chart feed. Narrow on purpose so
/// tests substitute a deterministic in-memory feed.
pub trait ChartFeed: Send + Sync {
    fn daily_history<'a>(
        &'a self,
        symbol: &'a Symbol,
        start: TradingDate,
        end: TradingDate,
    ) -> BoxFuture<'a, Result<Vec<SessionBar>, SourceError>>;
}

/// Public-feed quote source with lookback widening and a rate gate.
pub struct YahooSource {
    feed: Arc<dyn ChartFeed>,
    policy: ProviderPolicy,
    gate: RateGate,
    clock: Arc<dyn Clock>,
}

impl YahooSource {
    pub fn new(feed: Arc<dyn ChartFeed>) -> Self {
        Self::with_policy(feed, ProviderPolicy::yahoo_default())
    }

    pub fn with_policy(feed: Arc<dyn ChartFeed>, policy: ProviderPolicy) -> Self {
        let gate = RateGate::from_policy(&policy);
        Self {
            feed,
            policy,
            gate,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn session_quote(
        &self,
        symbol: &Symbol,
        session: &TradingSession,
        as_of: UtcDateTime,
    ) -> Option<SymbolQuote> {
        let target = session.date();
        let end = target.next_day()?;

        for window in &self.policy.lookback_windows {
            let Some(start) = target.checked_sub_days(*window) else {
                continue;
            };

            let rows = match self.fetch_with_retry(symbol, start, end).await {
                Ok(rows) => rows,
                Err(err) => {
                    debug!(symbol = %symbol, error = %err, "history fetch failed, dropping symbol");
                    return None;
                }
            };

            if let Some(quote) = quote_from_rows(symbol, rows, target, as_of) {
                return Some(quote);
            }

            debug!(symbol = %symbol, window, "no usable rows in window, widening");
        }

        None
    }

    async fn fetch_with_retry(
        &self,
        symbol: &Symbol,
        start: TradingDate,
        end: TradingDate,
    ) -> Result<Vec<SessionBar>, SourceError> {
        let backoff = &self.policy.retry_backoff;
        let mut attempt: u32 = 0;

        loop {
            let call = self.feed.daily_history(symbol, start, end);
            let outcome = tokio::time::timeout(self.policy.request_timeout, call).await;

            let error = match outcome {
                Ok(Ok(rows)) => return Ok(rows),
                Ok(Err(err)) => err,
                Err(_) => SourceError::timeout(format!(
                    "chart request for {symbol} exceeded {:?}",
                    self.policy.request_timeout
                )),
            };

            if !error.retryable() || attempt >= backoff.max_retries {
                return Err(error);
            }

            let delay = backoff.delay(attempt);
            debug!(symbol = %symbol, attempt, ?delay, error = %error, "retrying chart request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl MarketDataPort for YahooSource {
    fn fetch_session_quotes<'a>(
        &'a self,
        symbols: &'a [Symbol],
        session: &'a TradingSession,
    ) -> BoxFuture<'a, Result<QuoteSet, SourceError>> {
        Box::pin(async move {
            let as_of = UtcDateTime::from_instant(self.clock.now_utc());
            let mut quotes = BTreeMap::new();

            for symbol in symbols {
                if let Err(delay) = self.gate.acquire() {
                    tokio::time::sleep(delay).await;
                }

                match self.session_quote(symbol, session, as_of).await {
                    Some(quote) => {
                        quotes.insert(symbol.clone(), quote);
                    }
                    None => {
                        debug!(symbol = %symbol, date = %session.date(), "no session data from chart feed");
                    }
                }
            }

            Ok(QuoteSet::new(
                Some(ProviderId::Yahoo),
                vec![ProviderId::Yahoo],
                symbols.len(),
                quotes,
                Vec::new(),
            ))
        })
    }
}

/// Pick the most recent row at or before the target session and pair it
/// with the preceding row's close as the reference price.
fn quote_from_rows(
    symbol: &Symbol,
    mut rows: Vec<SessionBar>,
    target: TradingDate,
    as_of: UtcDateTime,
) -> Option<SymbolQuote> {
    rows.sort_by_key(|row| row.date);
    let index = rows.iter().rposition(|row| row.date <= target)?;

    let prev_close = index
        .checked_sub(1)
        .map(|prev| rows[prev].close)
        .filter(|close| *close > 0.0);

    match SymbolQuote::from_daily_bar(symbol.clone(), &rows[index], prev_close, as_of) {
        Ok(quote) => Some(quote),
        Err(err) => {
            debug!(symbol = %symbol, error = %err, "dropping invalid chart row");
            None
        }
    }
}

/// Production `ChartFeed` over the Yahoo v8 chart endpoint.
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: String,
    /// Exchange suffix appended to tickers, `.NS` for NSE listings.
    symbol_suffix: String,
}

impl Default for YahooChartClient {
    fn default() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: String::from("https://query1.finance.yahoo.com"),
            symbol_suffix: String::from(".NS"),
        }
    }
}

impl YahooChartClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_symbol_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.symbol_suffix = suffix.into();
        self
    }
}

impl ChartFeed for YahooChartClient {
    fn daily_history<'a>(
        &'a self,
        symbol: &'a Symbol,
        start: TradingDate,
        end: TradingDate,
    ) -> BoxFuture<'a, Result<Vec<SessionBar>, SourceError>> {
        Box::pin(async move {
            let ticker = format!("{}{}", symbol.as_str(), self.symbol_suffix);
            let url = format!(
                "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
                self.base_url,
                urlencoding::encode(&ticker),
                start.unix_midnight(),
                end.unix_midnight(),
            );

            let response = self.http.get(&url).send().await.map_err(request_error)?;
            let status = response.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(SourceError::auth(format!(
                    "chart feed rejected request for {ticker}: {status}"
                )));
            }
            if status.as_u16() == 404 {
                return Err(SourceError::no_data(format!(
                    "chart feed has no listing for {ticker}"
                )));
            }
            if !status.is_success() {
                return Err(SourceError::transport(format!(
                    "chart feed returned {status} for {ticker}"
                )));
            }

            let payload: ChartResponse = response.json().await.map_err(request_error)?;
            bars_from_payload(payload)
        })
    }
}

fn request_error(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::timeout(err.to_string())
    } else {
        SourceError::transport(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartNode,
}

#[derive(Debug, Deserialize)]
struct ChartNode {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuoteBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

fn bars_from_payload(payload: ChartResponse) -> Result<Vec<SessionBar>, SourceError> {
    if let Some(error) = payload.chart.error {
        let detail = error.description.unwrap_or_default();
        return Err(SourceError::no_data(format!("{}: {detail}", error.code)));
    }

    let Some(result) = payload.chart.result.and_then(|mut r| {
        if r.is_empty() {
            None
        } else {
            Some(r.remove(0))
        }
    }) else {
        return Ok(Vec::new());
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let Some(ohlcv) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (index, ts) in timestamps.iter().enumerate() {
        let row = (
            ohlcv.open.get(index).copied().flatten(),
            ohlcv.high.get(index).copied().flatten(),
            ohlcv.low.get(index).copied().flatten(),
            ohlcv.close.get(index).copied().flatten(),
            ohlcv.volume.get(index).copied().flatten(),
        );

        // Feed pads rows with nulls on non-trading days; skip them.
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = row else {
            continue;
        };

        let Ok(stamp) = time::OffsetDateTime::from_unix_timestamp(*ts) else {
            continue;
        };
        let date = TradingDate::from(stamp.date());

        match SessionBar::new(date, open, high, low, close, volume) {
            Ok(bar) => bars.push(bar),
            Err(err) => {
                debug!(%date, error = %err, "skipping malformed chart row");
            }
        }
    }

    Ok(bars)
}
