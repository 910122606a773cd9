//! Exponential backoff between provider delivery attempts

use std::time::Duration;

use rand::Rng;

use crate::config::DeliveryConfig;

/// Exponential backoff configuration
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Initial delay in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum delay in milliseconds
    pub max_delay_ms: u64,
    /// Multiplier for exponential growth
    pub multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 200,
            max_delay_ms: 5_000,
            multiplier: 2.0,
            jitter_factor: 0.1, // 10% jitter
        }
    }
}

impl From<&DeliveryConfig> for BackoffConfig {
    fn from(delivery: &DeliveryConfig) -> Self {
        Self {
            initial_delay_ms: delivery.initial_backoff_ms,
            max_delay_ms: delivery.max_backoff_ms.max(delivery.initial_backoff_ms),
            ..Self::default()
        }
    }
}

/// Exponential backoff calculator with jitter
pub struct ExponentialBackoff {
    config: BackoffConfig,
    current_delay_ms: u64,
    attempt: u32,
}

impl ExponentialBackoff {
    /// Create a new exponential backoff with custom configuration
    pub fn with_config(config: BackoffConfig) -> Self {
        let initial = config.initial_delay_ms;
        Self {
            config,
            current_delay_ms: initial,
            attempt: 0,
        }
    }

    /// Get the next delay duration. The first delay is the initial delay.
    pub fn next_delay(&mut self) -> Duration {
        self.attempt += 1;

        let base_delay = if self.attempt == 1 {
            self.config.initial_delay_ms as f64
        } else {
            self.current_delay_ms as f64 * self.config.multiplier
        };
        let capped_delay = base_delay.min(self.config.max_delay_ms as f64);
        self.current_delay_ms = capped_delay as u64;

        // Jitter is applied to the returned delay only, growth stays deterministic
        let final_delay = if self.config.jitter_factor > 0.0 && capped_delay > 0.0 {
            let jitter_range = capped_delay * self.config.jitter_factor;
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0) as u64
        } else {
            capped_delay as u64
        };

        Duration::from_millis(final_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter(initial: u64, max: u64, multiplier: f64) -> BackoffConfig {
        BackoffConfig {
            initial_delay_ms: initial,
            max_delay_ms: max,
            multiplier,
            jitter_factor: 0.0,
        }
    }

    #[test]
    fn test_exponential_backoff_increases() {
        let mut backoff = ExponentialBackoff::with_config(no_jitter(100, 10_000, 2.0));

        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(400));
    }

    #[test]
    fn test_exponential_backoff_caps_at_max() {
        let mut backoff = ExponentialBackoff::with_config(no_jitter(1000, 5000, 10.0));

        for _ in 0..5 {
            backoff.next_delay();
        }

        assert_eq!(backoff.next_delay(), Duration::from_millis(5000));
    }

    #[test]
    fn test_from_delivery_config() {
        let delivery = DeliveryConfig {
            max_retries: 3,
            initial_backoff_ms: 50,
            max_backoff_ms: 10,
        };
        let config = BackoffConfig::from(&delivery);
        assert_eq!(config.initial_delay_ms, 50);
        assert_eq!(config.max_delay_ms, 50);
    }

    #[test]
    fn test_zero_delay_stays_zero() {
        let mut backoff = ExponentialBackoff::with_config(BackoffConfig {
            initial_delay_ms: 0,
            max_delay_ms: 0,
            ..BackoffConfig::default()
        });
        assert_eq!(backoff.next_delay(), Duration::ZERO);
    }
}
