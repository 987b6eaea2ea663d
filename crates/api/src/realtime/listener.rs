//! The single relay subscription feeding the engine.

use std::sync::Arc;
use std::time::Duration;

use followup_engine::FollowupEngine;
use tracing::{error, info, warn};

/// Backoff for resubscribing after the relay stream drops.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of retries (None = infinite).
    pub max_retries: Option<u32>,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier for each retry.
    pub backoff_multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Calculate delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }

    /// Check if we should retry after the given number of attempts.
    pub fn should_retry(&self, attempts: u32) -> bool {
        self.max_retries.map_or(true, |max| attempts < max)
    }
}

/// Subscribe to the driver channels and hand every event to the engine,
/// resubscribing with backoff whenever the subscription fails or ends.
pub async fn run_relay_listener(engine: Arc<FollowupEngine>, reconnect: ReconnectConfig) {
    let mut attempts = 0;

    loop {
        match engine.relay().bot_events().await {
            Ok(events) => {
                info!("Listening on relay bus {}", engine.relay().bus().name());
                attempts = 0;
                engine.clone().consume(events).await;
            }
            Err(e) => warn!("Relay subscription failed: {}", e),
        }

        if !reconnect.should_retry(attempts) {
            error!("Giving up on relay subscription after {} attempts", attempts);
            return;
        }

        let delay = reconnect.delay_for_attempt(attempts);
        attempts += 1;
        info!("Resubscribing to relay in {:?} (attempt {})", delay, attempts);
        tokio::time::sleep(delay).await;
    }
}
