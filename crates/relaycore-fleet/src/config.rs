//! Fleet configuration.

/// Configuration for the fleet's allocation event bus.
#[derive(Debug, Clone, Copy)]
pub struct FleetConfig {
    /// Capacity of each allocation-event subscriber's channel. Publishing
    /// is non-blocking (`try_send`): a subscriber that falls behind misses
    /// events rather than stalling an allocation.
    pub subscriber_queue_capacity: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self { subscriber_queue_capacity: 32 }
    }
}
