//! Primary strategy: an authenticated broker feed queried in batches.
//!
//! The broker connection arrives pre-authenticated and opaque; credential
//! management lives outside this crate. Any call-level failure here is a
//! recoverable signal for the router to fall back to the public feed.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::data_source::{BoxFuture, MarketDataPort, QuoteSet, SourceError};
use crate::policy::ProviderPolicy;
use crate::{ProviderId, SessionBar, Symbol, SymbolQuote, TradingDate, TradingSession, UtcDateTime};

/// One broker row: a symbol with its daily bar for the requested date.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBar {
    pub symbol: Symbol,
    pub bar: SessionBar,
}

/// Opaque pre-authenticated broker connection. One call fetches the daily
/// bars for a batch of symbols in a single round trip.
pub trait BrokerSession: Send + Sync {
    fn daily_bars<'a>(
        &'a self,
        symbols: &'a [Symbol],
        date: TradingDate,
    ) -> BoxFuture<'a, Result<Vec<SymbolBar>, SourceError>>;
}

/// Broker-backed quote source.
pub struct KiteSource {
    session: Arc<dyn BrokerSession>,
    policy: ProviderPolicy,
    clock: Arc<dyn Clock>,
}

impl KiteSource {
    pub fn new(session: Arc<dyn BrokerSession>) -> Self {
        Self {
            session,
            policy: ProviderPolicy::kite_default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_policy(mut self, policy: ProviderPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl MarketDataPort for KiteSource {
    fn fetch_session_quotes<'a>(
        &'a self,
        symbols: &'a [Symbol],
        session: &'a TradingSession,
    ) -> BoxFuture<'a, Result<QuoteSet, SourceError>> {
        Box::pin(async move {
            let as_of = UtcDateTime::from_instant(self.clock.now_utc());
            let requested: BTreeSet<&Symbol> = symbols.iter().collect();
            let mut quotes = BTreeMap::new();

            let batch_size = self.policy.batch_size.max(1);
            for chunk in symbols.chunks(batch_size) {
                let call = self.session.daily_bars(chunk, session.date());
                let rows = match tokio::time::timeout(self.policy.request_timeout, call).await {
                    Ok(result) => result?,
                    Err(_) => {
                        return Err(SourceError::timeout(format!(
                            "broker batch of {} symbols exceeded {:?}",
                            chunk.len(),
                            self.policy.request_timeout
                        )))
                    }
                };

                for row in rows {
                    if !requested.contains(&row.symbol) {
                        debug!(symbol = %row.symbol, "broker returned unrequested symbol, ignoring");
                        continue;
                    }

                    // Single-day broker rows carry no previous close; the
                    // scoring reference falls back to the session open.
                    match SymbolQuote::from_daily_bar(row.symbol.clone(), &row.bar, None, as_of) {
                        Ok(quote) => {
                            quotes.insert(row.symbol, quote);
                        }
                        Err(err) => {
                            debug!(symbol = %row.symbol, error = %err, "dropping invalid broker row");
                        }
                    }
                }
            }

            Ok(QuoteSet::new(
                Some(ProviderId::Kite),
                vec![ProviderId::Kite],
                symbols.len(),
                quotes,
                Vec::new(),
            ))
        })
    }
}
