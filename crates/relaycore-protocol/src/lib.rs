//! Wire protocol for the room/fleet stack.
//!
//! This crate defines the "language" that game-node clients, game nodes,
//! and the master node speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`MasterServerMessage`],
//!   [`LobbyMessage`], and the id/addr/status types) — the message
//!   structures that travel on the wire.
//! - **Errors** ([`ProtocolError`]) — what can go wrong building or
//!   validating one of those messages.
//!
//! # Architecture
//!
//! This layer does not frame bytes or open sockets — that is a transport
//! concern external to this crate. It only fixes the logical message set
//! and its serde representation, so every layer above (session, fleet)
//! agrees on vocabulary regardless of what eventually carries the bytes.
//!
//! ```text
//! Transport (bytes, external) → Protocol (this crate) → Session / Fleet
//! ```

mod error;
mod types;

pub use error::ProtocolError;
pub use types::{
    ActorId, ClientMessage, CommandKind, CreateRoomRequest, CreateRoomResponse, GameServerAddr,
    GameServerId, JoinRoomRequest, JoinRoomResponse, LobbyMessage, MasterServerMessage,
    RegisterGameServerRequest, RoomId, RoomListEntry, RoomStatus, ServerMessage,
    UpdateRoomStatusRequest, ERROR_CODE_ROOM_NOT_FOUND, GAMESERVER_ID_METADATA_KEY,
};
