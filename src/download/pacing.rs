//! Delays between requests.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::config::PacingConfig;

/// Sleeps a fixed base plus a uniform random jitter between requests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pacer {
    base: f64,
    jitter: (f64, f64),
}

impl Pacer {
    pub fn new(base: f64, jitter: (f64, f64)) -> Self {
        Self { base, jitter }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        let [low, high] = config.sleep_random;
        Self::new(config.sleep, (low, high))
    }

    /// Whether any delay is configured.
    pub fn is_enabled(&self) -> bool {
        self.base > 0.0 || self.jitter.1 > 0.0
    }

    /// Pick the next delay.
    pub fn next_delay(&self) -> Duration {
        let (low, high) = self.jitter;
        let jitter = if high > low {
            rand::thread_rng().gen_range(low..=high)
        } else {
            low
        };
        Duration::from_secs_f64((self.base + jitter).max(0.0))
    }

    /// Sleep for the next delay, if any is configured.
    pub async fn pause(&self) {
        if !self.is_enabled() {
            return;
        }

        let delay = self.next_delay();
        tracing::info!("Sleeping for {:.2} seconds", delay.as_secs_f64());
        sleep(delay).await;
    }
}
