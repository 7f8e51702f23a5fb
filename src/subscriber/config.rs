//! Subscriber configuration

use std::time::Duration;

/// Subscriber client configuration options
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Interval between recovery attempts while awaiting content
    ///
    /// Each tick re-checks the snapshot store and re-sends
    /// `request_content`. Stops once authoritative content is displayed.
    pub retry_interval: Duration,

    /// Backoff between subscribe attempts when the topic refuses a new
    /// subscriber
    pub subscribe_backoff: Duration,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(1000),
            subscribe_backoff: Duration::from_millis(250),
        }
    }
}

impl SubscriberConfig {
    /// Set the retry poll interval
    pub fn retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Set the subscribe retry backoff
    pub fn subscribe_backoff(mut self, backoff: Duration) -> Self {
        self.subscribe_backoff = backoff;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SubscriberConfig::default();

        assert_eq!(config.retry_interval, Duration::from_millis(1000));
        assert_eq!(config.subscribe_backoff, Duration::from_millis(250));
    }

    #[test]
    fn test_builder_chaining() {
        let config = SubscriberConfig::default()
            .retry_interval(Duration::from_millis(50))
            .subscribe_backoff(Duration::from_millis(10));

        assert_eq!(config.retry_interval, Duration::from_millis(50));
        assert_eq!(config.subscribe_backoff, Duration::from_millis(10));
    }
}
