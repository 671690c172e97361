//! Room configuration and lifecycle state machine.

use serde::{Deserialize, Serialize};

/// Configuration for a room's broadcast engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Capacity of each member's outbound queue. A delivery is dropped for
    /// a member whose queue is already full; other members are unaffected.
    pub outbound_queue_capacity: usize,

    /// Capacity of the room's own inbound command mailbox.
    pub command_queue_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: 128,
            command_queue_capacity: 64,
        }
    }
}

/// The lifecycle state of a room's broadcast engine.
///
/// ```text
/// Running → Stopping → Stopped
/// ```
///
/// There is no "game" phase here — a room is a full-mesh broadcast group,
/// not a match with a start/finish. `Running` is every state between
/// creation and `stop()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    Running,
    Stopping,
    Stopped,
}

impl RoomState {
    /// Returns `true` if the room still accepts joins, leaves, and sends.
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Stopping => write!(f, "Stopping"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_constants() {
        let config = RoomConfig::default();
        assert_eq!(config.outbound_queue_capacity, 128);
        assert_eq!(config.command_queue_capacity, 64);
    }

    #[test]
    fn only_running_is_running() {
        assert!(RoomState::Running.is_running());
        assert!(!RoomState::Stopping.is_running());
        assert!(!RoomState::Stopped.is_running());
    }

    #[test]
    fn room_state_display() {
        assert_eq!(RoomState::Running.to_string(), "Running");
        assert_eq!(RoomState::Stopping.to_string(), "Stopping");
        assert_eq!(RoomState::Stopped.to_string(), "Stopped");
    }
}
