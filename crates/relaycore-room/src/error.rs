//! Error types for the room layer.

use relaycore_protocol::RoomId;

/// Errors that can occur during room broadcast-engine or registry
/// operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist in the registry.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room's mailbox is closed — it has stopped or is stopping.
    /// Corresponds to the spec's "closed-queue signal" returned to callers
    /// of a post-`Stopped` operation.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
