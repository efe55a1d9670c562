//! Exponential backoff between connection attempts.

use std::time::Duration;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor the delay grows by after each failure.
    pub multiplier: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2,
        }
    }
}

/// Next backoff delay, clamped to [`ReconnectConfig::max_delay`].
#[must_use]
pub fn next_delay(current: Duration, config: &ReconnectConfig) -> Duration {
    current.saturating_mul(config.multiplier).min(config.max_delay)
}
