//! Error types for the fleet layer.

use relaycore_protocol::{GameServerId, RoomId};

/// Errors that can occur while registering game nodes, allocating rooms,
/// or relaying updates and allocation events.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// No registered game node has spare room capacity.
    #[error("not enough game servers")]
    NotEnoughGameServers,

    /// The given room id is already tracked on some node.
    #[error("room {0} is already allocated")]
    RoomAlreadyAllocated(RoomId),

    /// `update_room_status` targets a room the fleet does not track.
    #[error("room status for {0} not found")]
    RoomStatusNotFound(RoomId),

    /// No node currently owns this room id (distinct from
    /// `RoomStatusNotFound`: this is a lookup miss, not a stale update).
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The `Update` RPC's metadata carried no game-server-id header.
    #[error("missing {} metadata", relaycore_protocol::GAMESERVER_ID_METADATA_KEY)]
    MissingAuth,

    /// The `Update` RPC's metadata carried an id that is not a currently
    /// registered game node.
    #[error("game server {0} is not a registered id")]
    Unauthorized(GameServerId),

    /// A send/recv on a subscriber's stream failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// A `RoomStatus` supplied to `allocate_room`/`update_room_status`
    /// failed protocol-level validation (e.g. an empty name).
    #[error(transparent)]
    Protocol(#[from] relaycore_protocol::ProtocolError),
}
