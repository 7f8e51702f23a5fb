//! Broker configuration

/// Broker configuration options
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Capacity of each topic's broadcast channel
    ///
    /// A slow subscriber that falls more than this many messages behind
    /// skips ahead to the newest messages (best-effort delivery).
    pub broadcast_capacity: usize,

    /// Maximum subscribers per topic (0 = unlimited)
    pub max_subscribers_per_topic: u32,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
            max_subscribers_per_topic: 0, // Unlimited
        }
    }
}

impl BrokerConfig {
    /// Set the broadcast channel capacity (minimum 1)
    pub fn broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.max(1);
        self
    }

    /// Set the per-topic subscriber limit
    pub fn max_subscribers_per_topic(mut self, max: u32) -> Self {
        self.max_subscribers_per_topic = max;
        self
    }
}
