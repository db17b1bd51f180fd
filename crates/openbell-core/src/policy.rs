use std::time::Duration;

use crate::ProviderId;

/// Per-provider fetch tuning: deadlines, batching, lookback widening,
/// rate quota, and retry backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderPolicy {
    pub provider: ProviderId,
    /// Deadline for a single upstream round trip.
    pub request_timeout: Duration,
    /// Symbols per round trip for batch-capable providers.
    pub batch_size: usize,
    /// Lookback windows in calendar days, tried narrowest first.
    pub lookback_windows: Vec<u16>,
    pub quota_window: Duration,
    pub quota_limit: u32,
    pub retry_backoff: BackoffPolicy,
}

impl ProviderPolicy {
    pub fn kite_default() -> Self {
        Self {
            provider: ProviderId::Kite,
            request_timeout: Duration::from_secs(5),
            batch_size: 50,
            lookback_windows: Vec::new(),
            quota_window: Duration::from_secs(1),
            quota_limit: 3,
            retry_backoff: BackoffPolicy::default(),
        }
    }

    pub fn yahoo_default() -> Self {
        Self {
            provider: ProviderId::Yahoo,
            request_timeout: Duration::from_secs(10),
            batch_size: 1,
            lookback_windows: vec![5, 10, 30],
            quota_window: Duration::from_secs(60),
            quota_limit: 120,
            retry_backoff: BackoffPolicy::default(),
        }
    }

    pub fn default_for(provider: ProviderId) -> Self {
        match provider {
            ProviderId::Kite => Self::kite_default(),
            ProviderId::Yahoo => Self::yahoo_default(),
        }
    }
}

/// Bounded exponential backoff between retries of a retryable failure.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub max_retries: u32,
    /// Spread delays +/- 50% to avoid retry alignment across symbols.
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            max_retries: 2,
            jitter: true,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let scale = self.multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let seconds = self.initial_delay.as_secs_f64() * scale;
        let capped = seconds.min(self.max_delay.as_secs_f64());
        let mut delay = Duration::from_secs_f64(capped);

        if self.jitter {
            let half = (delay.as_millis() as u64) / 2;
            if half > 0 {
                let offset = fastrand::u64(0..=half * 2);
                let total = delay.as_millis() as i64 + offset as i64 - half as i64;
                delay = Duration::from_millis(total.max(0) as u64);
            }
        }

        delay
    }
}
