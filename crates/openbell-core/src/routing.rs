//! Two-tier fetch policy: authenticated broker first, public feed on any
//! recoverable primary failure. Fallback is behaviorally transparent to the
//! caller; the only trace it leaves is in provenance and the log.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::data_source::{BoxFuture, MarketDataPort, QuoteSet, SourceError};
use crate::{ProviderId, Symbol, TradingSession};

/// A registered source: the port plus the identity used in provenance.
#[derive(Clone)]
pub struct SourceHandle {
    id: ProviderId,
    port: Arc<dyn MarketDataPort>,
}

impl SourceHandle {
    pub fn new(id: ProviderId, port: Arc<dyn MarketDataPort>) -> Self {
        Self { id, port }
    }

    pub const fn id(&self) -> ProviderId {
        self.id
    }
}

/// Router implementing the data port over an optional primary and a
/// mandatory secondary strategy.
pub struct FallbackRouter {
    primary: Option<SourceHandle>,
    secondary: SourceHandle,
    volume_floor: Option<u64>,
}

impl FallbackRouter {
    pub fn new(primary: Option<SourceHandle>, secondary: SourceHandle) -> Self {
        Self {
            primary,
            secondary,
            volume_floor: None,
        }
    }

    /// Drop rows below this traded-volume floor, with provenance accounting.
    pub fn with_volume_floor(mut self, floor: Option<u64>) -> Self {
        self.volume_floor = floor;
        self
    }

    fn apply_volume_floor(&self, quotes: &mut BTreeMap<Symbol, crate::SymbolQuote>, notes: &mut Vec<String>) {
        let Some(floor) = self.volume_floor else {
            return;
        };

        let before = quotes.len();
        quotes.retain(|_, quote| quote.volume >= floor);
        let removed = before - quotes.len();
        if removed > 0 {
            notes.push(format!("{removed} row(s) below volume floor {floor}"));
        }
    }
}

impl MarketDataPort for FallbackRouter {
    fn fetch_session_quotes<'a>(
        &'a self,
        symbols: &'a [Symbol],
        session: &'a TradingSession,
    ) -> BoxFuture<'a, Result<QuoteSet, SourceError>> {
        Box::pin(async move {
            let requested = symbols.len();
            let mut chain = Vec::new();
            let mut notes = Vec::new();
            let mut chosen: Option<QuoteSet> = None;

            if let Some(primary) = &self.primary {
                chain.push(primary.id);
                match primary.port.fetch_session_quotes(symbols, session).await {
                    Ok(set) if set.is_empty() => {
                        warn!(provider = %primary.id, date = %session.date(), "primary returned zero rows, falling back");
                        notes.push(format!(
                            "{} returned no rows for {}",
                            primary.id,
                            session.date()
                        ));
                    }
                    Ok(set) => chosen = Some(set),
                    Err(err) => {
                        warn!(provider = %primary.id, error = %err, "primary fetch failed, falling back");
                        notes.push(format!("{} failed: {err}", primary.id));
                    }
                }
            }

            let fell_back = chosen.is_none();
            let set = match chosen {
                Some(set) => set,
                None => {
                    chain.push(self.secondary.id);
                    match self.secondary.port.fetch_session_quotes(symbols, session).await {
                        Ok(set) => set,
                        Err(err) => {
                            warn!(provider = %self.secondary.id, error = %err, "secondary fetch failed");
                            notes.push(format!("{} failed: {err}", self.secondary.id));
                            QuoteSet::new(None, Vec::new(), requested, BTreeMap::new(), Vec::new())
                        }
                    }
                }
            };

            if fell_back && self.primary.is_some() && !set.is_empty() {
                info!(provider = %self.secondary.id, rows = set.len(), "fallback served the request");
            }

            let mut quotes = set.quotes;
            self.apply_volume_floor(&mut quotes, &mut notes);
            notes.extend(set.provenance.notes);

            Ok(QuoteSet::new(
                set.provenance.served_by,
                chain,
                requested,
                quotes,
                notes,
            ))
        })
    }
}
