//! Unified error type composing every layer's own error enum.

use relaycore_fleet::FleetError;
use relaycore_room::RoomError;
use relaycore_session::SessionError;
use relaycore_transport::TransportError;

/// Top-level error wrapping every sub-crate's error type via `#[from]`, so
/// the `?` operator converts them automatically at the wiring layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A room broadcast-engine or registry error.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A session-handler error (always transport-fatal — see
    /// [`SessionError`]).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A fleet-level error (allocation, lookup, auth).
    #[error(transparent)]
    Fleet(#[from] FleetError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaycore_protocol::RoomId;

    #[test]
    fn wraps_transport_error() {
        let err: Error = TransportError::SendFailed.into();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn wraps_room_error() {
        let err: Error = RoomError::NotFound(RoomId(1)).into();
        assert!(matches!(err, Error::Room(_)));
    }

    #[test]
    fn wraps_session_error() {
        let err: Error = SessionError::Transport("closed".into()).into();
        assert!(matches!(err, Error::Session(_)));
    }

    #[test]
    fn wraps_fleet_error() {
        let err: Error = FleetError::NotEnoughGameServers.into();
        assert!(matches!(err, Error::Fleet(_)));
    }
}
