use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{ProviderId, Symbol, SymbolQuote, TradingSession};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Authentication rejected or session expired.
    Auth,
    /// Transport failure (connect, TLS, malformed payload).
    Transport,
    /// The bounded per-call deadline elapsed.
    Timeout,
    /// The provider answered but had no rows for the request.
    NoData,
    /// The request itself was malformed.
    InvalidRequest,
}

/// Structured provider error consumed by the fallback router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Auth,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NoData,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Auth => "source.auth",
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::NoData => "source.no_data",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Which strategy served a fetch and how much of the request survived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Provider whose rows populate the mapping; `None` when nothing served.
    pub served_by: Option<ProviderId>,
    /// Providers attempted, in order.
    pub source_chain: Vec<ProviderId>,
    pub requested: usize,
    /// Symbols requested but absent from the mapping.
    pub dropped: usize,
    /// Human-readable fallback and drop annotations.
    pub notes: Vec<String>,
}

/// Session quotes keyed by symbol, plus fetch provenance.
///
/// The key set is always a subset of the requested symbols, and
/// `provenance.dropped == provenance.requested - quotes.len()` holds by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSet {
    pub quotes: BTreeMap<Symbol, SymbolQuote>,
    pub provenance: Provenance,
}

impl QuoteSet {
    pub fn new(
        served_by: Option<ProviderId>,
        source_chain: Vec<ProviderId>,
        requested: usize,
        quotes: BTreeMap<Symbol, SymbolQuote>,
        notes: Vec<String>,
    ) -> Self {
        let dropped = requested.saturating_sub(quotes.len());
        Self {
            quotes,
            provenance: Provenance {
                served_by,
                source_chain,
                requested,
                dropped,
                notes,
            },
        }
    }

    /// Empty result for a fetch no provider could serve.
    pub fn unavailable(requested: usize, source_chain: Vec<ProviderId>, note: String) -> Self {
        Self::new(None, source_chain, requested, BTreeMap::new(), vec![note])
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

/// Capability to fetch one session's quotes for a set of symbols.
///
/// The orchestrator depends only on this interface; provider identity is
/// reported through provenance, never through the type.
pub trait MarketDataPort: Send + Sync {
    fn fetch_session_quotes<'a>(
        &'a self,
        symbols: &'a [Symbol],
        session: &'a TradingSession,
    ) -> BoxFuture<'a, Result<QuoteSet, SourceError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_count_is_derived_from_the_mapping() {
        let set = QuoteSet::new(
            Some(ProviderId::Yahoo),
            vec![ProviderId::Yahoo],
            5,
            BTreeMap::new(),
            Vec::new(),
        );
        assert_eq!(set.provenance.dropped, 5);
        assert!(set.is_empty());
    }

    #[test]
    fn source_error_codes_are_stable() {
        assert_eq!(SourceError::auth("expired").code(), "source.auth");
        assert_eq!(SourceError::timeout("5s elapsed").code(), "source.timeout");
        assert!(SourceError::transport("reset").retryable());
        assert!(!SourceError::no_data("empty window").retryable());
    }
}
