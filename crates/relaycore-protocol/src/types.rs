//! Wire message schema shared by the game-node and master-node surfaces.
//!
//! Everything here is a plain serde-derived type. The crate does not
//! prescribe a byte-level encoding — framing is a transport concern —
//! these types are what gets framed.

use serde::{Deserialize, Serialize};

/// Metadata key carrying a game node's [`GameServerId`] on the `Update` RPC.
///
/// Kept as the literal the rest of this ecosystem's deployments already
/// expect on the wire.
pub const GAMESERVER_ID_METADATA_KEY: &str = "quark-gameserver-id";

/// The only documented application-level error code: the target room does
/// not exist.
pub const ERROR_CODE_ROOM_NOT_FOUND: &str = "001";

/// Opaque identity of a session's actor inside a room.
///
/// Generated once at session start and immutable for the session's
/// lifetime. 128 bits of randomness, not a sequential counter — actor
/// identity must not leak ordering information to peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u128);

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "actor-{:032x}", self.0)
    }
}

/// Identity of a room, unique within a master's lifetime. Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room-{}", self.0)
    }
}

/// Identity the master assigns a game node at registration time.
///
/// Distinct from the node's network address: an address can re-register
/// (e.g. after a restart) and receive a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameServerId(pub u128);

impl std::fmt::Display for GameServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gs-{:032x}", self.0)
    }
}

impl GameServerId {
    /// Encodes this id for transport as a metadata header value. Plain
    /// decimal, not the `gs-`-prefixed [`Display`](std::fmt::Display) form,
    /// since this is meant to be parsed back, not read by a human.
    pub fn to_metadata_value(self) -> String {
        self.0.to_string()
    }

    /// Parses an id previously produced by [`to_metadata_value`](Self::to_metadata_value).
    pub fn from_metadata_value(value: &str) -> Option<Self> {
        value.parse().ok().map(GameServerId)
    }
}

/// A game node's client-facing network endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameServerAddr {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for GameServerAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// The canonical "what's running on this node" record for one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomStatus {
    pub room_id: RoomId,
    pub room_name: String,
    pub actor_count: u32,
}

impl RoomStatus {
    /// Checks the protocol-level invariant that a room's name is never
    /// empty on the wire (§3: "Name is non-empty"). A room with no
    /// client-supplied name still gets one — the registry/lobby mint a
    /// synthetic unique name for it — so a `RoomStatus` with an empty name
    /// reaching this check is malformed, not merely anonymous.
    pub fn validate(&self) -> Result<(), crate::ProtocolError> {
        if self.room_name.is_empty() {
            return Err(crate::ProtocolError::InvalidMessage(format!(
                "room_name must not be empty (room_id={})",
                self.room_id
            )));
        }
        Ok(())
    }
}

/// A room entry as shown to lobby subscribers: no actor count, just
/// enough to route a join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomListEntry {
    pub room_id: RoomId,
    pub room_name: String,
}

/// Which inbound command an [`ServerMessage::OnCommandFailed`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    JoinRoom,
    LeaveRoom,
    SendMessage,
}

/// Client → session commands on the game-node `Service` stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    JoinRoom { room_id: RoomId },
    LeaveRoom,
    SendMessage { code: u32, payload: Vec<u8> },
}

/// Session → client events on the game-node `Service` stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    OnJoinRoomSuccess {
        actor_id: ActorId,
    },
    OnLeaveRoomSuccess,
    OnMessageReceived {
        sender_id: ActorId,
        code: u32,
        payload: Vec<u8>,
    },
    OnJoinRoom {
        actor_id_list: Vec<ActorId>,
        new_actor_id: ActorId,
    },
    OnLeaveRoom {
        actor_id_list: Vec<ActorId>,
        removed_actor_id: ActorId,
    },
    OnCommandFailed {
        error_code: String,
        error_detail: String,
        error_command: CommandKind,
    },
}

impl ServerMessage {
    /// Builds the one documented application error: a `JoinRoom`/`LeaveRoom`/
    /// `SendMessage` against a room that does not exist or that the session
    /// is not currently in.
    pub fn room_not_found(command: CommandKind, detail: impl Into<String>) -> Self {
        ServerMessage::OnCommandFailed {
            error_code: ERROR_CODE_ROOM_NOT_FOUND.to_string(),
            error_detail: detail.into(),
            error_command: command,
        }
    }
}

/// Lobby `CreateRoom` request/response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub room_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRoomResponse {
    pub room_id: RoomId,
    pub already_exist: bool,
}

/// Lobby `JoinRoom` request/response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub room_id: RoomId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub game_server: GameServerAddr,
}

/// Messages streamed to an `InLobby` subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LobbyMessage {
    RoomListUpdated { room_list: Vec<RoomListEntry> },
}

/// `RegisterGameServer` request (game node → master).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterGameServerRequest {
    pub addr: GameServerAddr,
    pub capacity: u32,
}

/// Messages streamed back on the `RegisterGameServer` RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MasterServerMessage {
    Registered { game_server_id: GameServerId },
    RoomAllocation { room: RoomListEntry },
}

/// One batch entry on the `Update` RPC: a game node reporting a room's
/// current actor count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRoomStatusRequest {
    pub updates: Vec<RoomStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_id_display_is_fixed_width_hex() {
        let id = ActorId(0x1);
        assert_eq!(id.to_string(), "actor-00000000000000000000000000000001");
    }

    #[test]
    fn room_id_round_trips_through_json() {
        let id = RoomId(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let back: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn client_message_tags_by_type() {
        let msg = ClientMessage::JoinRoom { room_id: RoomId(7) };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "JoinRoom");
        assert_eq!(json["room_id"], 7);
    }

    #[test]
    fn server_message_room_not_found_uses_documented_code() {
        let msg = ServerMessage::room_not_found(CommandKind::JoinRoom, "room does not exist");
        match msg {
            ServerMessage::OnCommandFailed { error_code, error_command, .. } => {
                assert_eq!(error_code, ERROR_CODE_ROOM_NOT_FOUND);
                assert_eq!(error_command, CommandKind::JoinRoom);
            }
            _ => panic!("expected OnCommandFailed"),
        }
    }

    #[test]
    fn lobby_message_round_trips() {
        let msg = LobbyMessage::RoomListUpdated {
            room_list: vec![RoomListEntry { room_id: RoomId(1), room_name: "foo".into() }],
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: LobbyMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn game_server_addr_displays_host_port() {
        let addr = GameServerAddr { host: "10.0.0.1".into(), port: 9000 };
        assert_eq!(addr.to_string(), "10.0.0.1:9000");
    }

    #[test]
    fn game_server_id_metadata_value_round_trips() {
        let id = GameServerId(0xdead_beef);
        let value = id.to_metadata_value();
        assert_eq!(GameServerId::from_metadata_value(&value), Some(id));
    }

    #[test]
    fn game_server_id_metadata_value_rejects_garbage() {
        assert_eq!(GameServerId::from_metadata_value("not-a-number"), None);
    }

    #[test]
    fn room_status_validate_rejects_empty_name() {
        let status = RoomStatus { room_id: RoomId(1), room_name: String::new(), actor_count: 0 };
        assert!(matches!(status.validate(), Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn room_status_validate_accepts_a_non_empty_name() {
        let status = RoomStatus { room_id: RoomId(1), room_name: "arena".into(), actor_count: 0 };
        assert!(status.validate().is_ok());
    }
}
